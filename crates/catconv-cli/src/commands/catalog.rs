use crate::cli::OptionArgs;
use crate::support::{Outcome, finish, load_options, or_exit, read_json_file};
use catconv_kernel::{Converter, transfer_catalog_ids};
use serde_json::Value;

pub struct Args {
    pub source: String,
    pub destination: Option<String>,
    pub options: OptionArgs,
    pub ids: Option<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let options = or_exit(load_options(&args.options));
    let input = or_exit(read_json_file(&args.source, "catalog"));
    let previous = args
        .ids
        .as_deref()
        .map(|path| or_exit(read_json_file(path, "ids catalog")));

    let mut converted = Converter::default().convert_catalog(&input, &options);

    if let (Some(previous), Some(result)) = (&previous, converted.result.as_mut()) {
        let replacements = transfer_catalog_ids(result, previous);
        tracing::info!(count = replacements.len(), "ids transferred");
    }

    finish(
        Outcome {
            result: converted.result.map(Value::Object),
            messages: &converted.messages,
            converted: None,
        },
        args.destination.as_deref(),
        args.json,
    );
}
