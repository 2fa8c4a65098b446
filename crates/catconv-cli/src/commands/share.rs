use crate::support::{Outcome, finish, or_exit, read_json_file};
use catconv_kernel::convert_share;

pub fn run(source: String, destination: Option<String>, json_output: bool) {
    let input = or_exit(read_json_file(&source, "share"));
    let migrated = convert_share(&input);

    if !json_output && migrated.result.is_some() && !migrated.converted {
        eprintln!("{source} is already a v8 share; copied unchanged");
    }

    finish(
        Outcome {
            result: migrated.result,
            messages: &migrated.messages,
            converted: Some(migrated.converted),
        },
        destination.as_deref(),
        json_output,
    );
}
