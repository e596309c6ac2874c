//! End-to-end parse/resolve scenarios over literal module bytes.

mod common;

use common::{
    body, data_segment, export_func, func_type, import_func, module, name, vec_of, HEADER,
};
use wasmspy::wasm::{self, ErrorKind, Immediate, SectionId};

#[test]
fn magic_and_version_only_resolves_empty() {
    let parsed = wasmspy::parse(HEADER).unwrap();
    assert_eq!(parsed.version, 1);
    assert!(parsed.sections.is_empty());

    let resolved = wasmspy::resolve(&parsed).unwrap();
    assert!(resolved.functions.is_empty());
    assert!(resolved.types.is_empty());
    assert!(resolved.exports.is_empty());
    assert!(resolved.start.is_none());
}

fn add_module() -> Vec<u8> {
    module(&[
        (1, vec_of(&[func_type(&[0x7F, 0x7F], &[0x7F])])),
        (3, vec_of(&[vec![0x00]])),
        (7, vec_of(&[export_func("add", 0)])),
        (
            10,
            vec_of(&[body(&[], &[0x20, 0x00, 0x20, 0x01, 0x6A, 0x0B])]),
        ),
    ])
}

#[test]
fn add_module_resolves_one_named_function() {
    let resolved = wasmspy::resolve(&wasmspy::parse(&add_module()).unwrap()).unwrap();
    assert_eq!(resolved.functions.len(), 1);

    let f = resolved.function(0).unwrap();
    assert_eq!(f.name, "add");
    assert!(!f.imported);
    let ty = f.ty.as_ref().unwrap();
    assert_eq!(ty.params.len(), 2);
    assert_eq!(ty.results.len(), 1);

    let instrs = &f.body.as_ref().unwrap().instructions;
    let names: Vec<&str> = instrs.iter().map(|i| i.name).collect();
    assert_eq!(names, ["local.get", "local.get", "i32.add", "end"]);
}

#[test]
fn imported_functions_come_first() {
    // env.log (i32) -> (), then a defined, exported `main`.
    let bytes = module(&[
        (
            1,
            vec_of(&[func_type(&[0x7F], &[]), func_type(&[], &[])]),
        ),
        (2, vec_of(&[import_func("env", "log", 0)])),
        (3, vec_of(&[vec![0x01]])),
        (7, vec_of(&[export_func("main", 1)])),
        (10, vec_of(&[body(&[], &[0x0B])])),
    ]);
    let resolved = wasmspy::resolve(&wasmspy::parse(&bytes).unwrap()).unwrap();

    assert_eq!(resolved.functions.len(), 2);
    let import = resolved.function(0).unwrap();
    assert_eq!(import.name, "env.log");
    assert!(import.imported);
    assert!(import.body.is_none());

    let main = resolved.function(1).unwrap();
    assert_eq!(main.name, "main");
    assert!(!main.imported);

    assert_eq!(resolved.imported_function_count(), 1);
    assert_eq!(resolved.function_by_name("main").unwrap().index, 1);
}

#[test]
fn global_init_literal_is_exposed() {
    // One immutable i32 global = 42.
    let bytes = module(&[(6, vec_of(&[vec![0x7F, 0x00, 0x41, 0x2A, 0x0B]]))]);
    let resolved = wasmspy::resolve(&wasmspy::parse(&bytes).unwrap()).unwrap();

    assert_eq!(resolved.globals.len(), 1);
    let global = &resolved.globals[0];
    assert_eq!(global.ty.ty, wasmspy::wasm::ValType::I32);
    assert!(!global.ty.mutable);
    assert_eq!(
        resolved.global_init_literal(global),
        Some(&Immediate::S32(42))
    );
}

#[test]
fn memory_with_data_builds_image() {
    let bytes = module(&[
        (5, vec_of(&[vec![0x00, 0x01]])),
        (11, vec_of(&[data_segment(0, 0, b"hello")])),
    ]);
    let resolved = wasmspy::resolve(&wasmspy::parse(&bytes).unwrap()).unwrap();

    assert_eq!(resolved.memories.len(), 1);
    assert_eq!(resolved.memories[0].min, 1);
    assert_eq!(resolved.data.len(), 1);

    let memory = resolved.build_memory();
    assert!(memory.len() >= 5);
    assert_eq!(&memory[..5], b"hello");
}

#[test]
fn section_offsets_account_for_whole_file() {
    let bytes = add_module();
    let parsed = wasmspy::parse(&bytes).unwrap();
    assert!(!parsed.sections.is_empty());

    let mut cursor = HEADER.len() as u64;
    for section in &parsed.sections {
        assert_eq!(section.offset, cursor, "section {:?}", section.id);
        assert_eq!(
            section.content_offset(),
            cursor + 1 + common::leb_u32(section.size).len() as u64
        );
        cursor = section.content_offset() + u64::from(section.size);
    }
    assert_eq!(cursor, bytes.len() as u64);
}

#[test]
fn function_indices_are_dense() {
    let bytes = module(&[
        (
            1,
            vec_of(&[func_type(&[0x7F], &[]), func_type(&[], &[])]),
        ),
        (
            2,
            vec_of(&[
                import_func("env", "log", 0),
                import_func("env", "abort", 0),
            ]),
        ),
        (3, vec_of(&[vec![0x01], vec![0x01]])),
        (10, vec_of(&[body(&[], &[0x0B]), body(&[], &[0x0B])])),
    ]);
    let resolved = wasmspy::resolve(&wasmspy::parse(&bytes).unwrap()).unwrap();

    assert_eq!(resolved.functions.len(), 4);
    for (i, f) in resolved.functions.iter().enumerate() {
        assert_eq!(f.index, i as u32);
        assert_eq!(resolved.function(f.index).unwrap().index, f.index);
        assert_eq!(f.imported, i < 2);
    }
}

#[test]
fn name_section_fills_in_unexported_names() {
    // Custom "name" section with function subsection naming index 0.
    let mut custom = name("name");
    let mut sub = vec![0x01]; // one entry
    sub.extend_from_slice(&[0x00]); // index 0
    sub.extend_from_slice(&name("checksum"));
    custom.push(1); // function-names subsection
    custom.extend_from_slice(&common::leb_u32(sub.len() as u32));
    custom.extend_from_slice(&sub);

    let bytes = module(&[
        (1, vec_of(&[func_type(&[], &[])])),
        (3, vec_of(&[vec![0x00]])),
        (10, vec_of(&[body(&[], &[0x0B])])),
        (0, custom),
    ]);
    let resolved = wasmspy::resolve(&wasmspy::parse(&bytes).unwrap()).unwrap();
    assert_eq!(resolved.function(0).unwrap().name, "checksum");
}

#[test]
fn export_name_wins_over_name_section() {
    let mut custom = name("name");
    let mut sub = vec![0x01, 0x00];
    sub.extend_from_slice(&name("internal"));
    custom.push(1);
    custom.extend_from_slice(&common::leb_u32(sub.len() as u32));
    custom.extend_from_slice(&sub);

    let bytes = module(&[
        (1, vec_of(&[func_type(&[], &[])])),
        (3, vec_of(&[vec![0x00]])),
        (7, vec_of(&[export_func("public", 0)])),
        (10, vec_of(&[body(&[], &[0x0B])])),
        (0, custom),
    ]);
    let resolved = wasmspy::resolve(&wasmspy::parse(&bytes).unwrap()).unwrap();
    assert_eq!(resolved.function(0).unwrap().name, "public");
}

#[test]
fn unknown_custom_sections_are_retained() {
    let mut custom = name("build.id");
    custom.extend_from_slice(&[0xDE, 0xAD]);
    let bytes = module(&[(0, custom)]);
    let parsed = wasmspy::parse(&bytes).unwrap();
    assert_eq!(parsed.sections[0].id, SectionId::Custom);

    let resolved = wasmspy::resolve(&parsed).unwrap();
    assert_eq!(resolved.custom.len(), 1);
    assert_eq!(resolved.custom[0].name, "build.id");
    assert_eq!(resolved.custom[0].data, vec![0xDE, 0xAD]);
}

#[test]
fn functype_with_bad_marker_is_invalid_section() {
    // Type section whose single entry starts with 0x61 at the marker
    // position.
    let bytes = module(&[(1, vec![0x01, 0x61, 0x00, 0x00])]);
    let err = wasmspy::resolve(&wasmspy::parse(&bytes).unwrap()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSection);
    // Offset points at the marker byte: header + id + size + count.
    assert_eq!(err.offset, HEADER.len() as u64 + 2 + 1);
}

#[test]
fn truncated_const_immediate_positions_error() {
    // Code body: i32.const with no immediate before end-of-body.
    let bytes = module(&[
        (1, vec_of(&[func_type(&[], &[0x7F])])),
        (3, vec_of(&[vec![0x00]])),
        (10, vec_of(&[body(&[], &[0x41])])),
    ]);
    let err = wasmspy::resolve(&wasmspy::parse(&bytes).unwrap()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Truncated);

    // The opcode byte is the last byte of the file; the error points one
    // past it, where the immediate should start.
    let opcode_offset = bytes.len() as u64 - 1;
    assert_eq!(err.offset, opcode_offset + 1);
}

#[test]
fn wat_renders_the_model() {
    let resolved = wasmspy::resolve(&wasmspy::parse(&add_module()).unwrap()).unwrap();
    let wat = resolved.to_wat();
    assert!(wat.starts_with("(module"));
    assert!(wat.contains("(export \"add\")"));
    assert!(wat.contains("i32.add"));
}

#[test]
fn disassembly_has_offset_per_line() {
    let resolved = wasmspy::resolve(&wasmspy::parse(&add_module()).unwrap()).unwrap();
    let text = wasmspy::disassemble_function(&resolved, 0, true, None).unwrap();
    for line in text.lines() {
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let (offset, rest) = line.split_once(": ").expect("offset-prefixed line");
        assert_eq!(offset.len(), 8, "line {line:?}");
        assert!(u64::from_str_radix(offset, 16).is_ok());
        assert!(!rest.is_empty());
    }
    assert!(text.contains("i32.add"));
}

#[test]
fn parse_detects_header_problems() {
    assert_eq!(
        wasm::parse(b"\x00wat\x01\x00\x00\x00").unwrap_err().kind,
        ErrorKind::InvalidMagic
    );
    assert_eq!(
        wasm::parse(b"\x00asm\x02\x00\x00\x00").unwrap_err().kind,
        ErrorKind::InvalidVersion
    );
    assert_eq!(wasm::parse(b"\x00as").unwrap_err().kind, ErrorKind::Truncated);
}
