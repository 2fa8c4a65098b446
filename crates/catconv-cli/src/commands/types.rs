use crate::support::{or_exit, write_json};
use catconv_kernel::{Registry, registry_json};

pub fn run(json_output: bool) {
    let registry = Registry::builtin();
    if json_output {
        or_exit(write_json(None, &registry_json(registry)));
        return;
    }

    println!("catconv types ({})", registry.len());
    for type_name in registry.types() {
        if let Some(entry) = registry.get(type_name) {
            println!("  {type_name:<24} {}", entry.model_type);
        }
    }
}
