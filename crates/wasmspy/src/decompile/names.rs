//! Display-name resolution for emitted pseudocode.

use crate::wasm::resolve::ResolvedModule;

use super::ast::CallTarget;

pub struct NameResolver<'a> {
    module: &'a ResolvedModule,
    func_index: u32,
    num_params: usize,
}

impl<'a> NameResolver<'a> {
    pub fn new(module: &'a ResolvedModule, func_index: u32, num_params: usize) -> NameResolver<'a> {
        NameResolver {
            module,
            func_index,
            num_params,
        }
    }

    /// Local slot name: the name-section entry if one exists, else `pN`
    /// for parameters and `vN` for the rest.
    pub fn local(&self, index: u32) -> String {
        if let Some(names) = &self.module.names {
            if let Some(locals) = names.local_names.get(&self.func_index) {
                if let Some(name) = locals.get(&index) {
                    return name.clone();
                }
            }
        }
        if (index as usize) < self.num_params {
            format!("p{index}")
        } else {
            format!("v{index}")
        }
    }

    pub fn global(&self, index: u32) -> String {
        format!("global{index}")
    }

    pub fn func(&self, target: CallTarget) -> String {
        match target {
            CallTarget::Indirect => "indirect".to_string(),
            CallTarget::Direct(index) => match self.module.function(index) {
                Some(f) if !f.name.is_empty() => f.name.clone(),
                _ => format!("func{index}"),
            },
        }
    }
}
