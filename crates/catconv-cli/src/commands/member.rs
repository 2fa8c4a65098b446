use crate::cli::OptionArgs;
use crate::support::{Outcome, finish, load_options, or_exit, read_json_file};
use catconv_kernel::convert_member;
use serde_json::Value;

pub fn run(source: String, options: OptionArgs, json_output: bool) {
    let options = or_exit(load_options(&options));
    let input = or_exit(read_json_file(&source, "member"));
    let converted = convert_member(&input, &options);

    finish(
        Outcome {
            result: converted.member.map(Value::Object),
            messages: &converted.messages,
            converted: None,
        },
        None,
        json_output,
    );
}
