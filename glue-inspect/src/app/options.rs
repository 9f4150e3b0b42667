use std::{fmt::Display, path::PathBuf};

use clap::{crate_description, crate_version, Arg, ArgAction, ArgMatches, Command};

use crate::app::error::RuntimeError;

// CLI Arg Names
pub const OPTION_INPUT_FORMAT: &str = "input-format";
pub const OPTION_OUTPUT_FORMAT: &str = "output-format";
pub const OPTION_INPUT: &str = "input";
pub const OPTION_EXPORT_PATH: &str = "export-path";
pub const OPTION_TOP_KEY: &str = "top-key";

// Other CLI Text
pub const SUPPORTED_INPUT_FORMATS: &str = "opack, tlv, archive, plist";
pub const SUPPORTED_OUTPUT_FORMATS: &str = "xml, json, opack";
pub const ABOUT: &str = concat!(
    "The `glue-inspect` binary decodes OPACK, TLV8, NSKeyedArchiver, and\n",
    "property list files and writes the decoded tree as an XML plist, JSON, or OPACK."
);

/// Kinds of data the inspector can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Opack,
    Tlv,
    /// A binary or XML `NSKeyedArchiver` plist, flattened into an ordinary tree
    Archive,
    /// Any binary or XML property list
    Plist,
}

impl InputFormat {
    pub fn from_cli(format: &str) -> Option<Self> {
        match format.to_lowercase().as_str() {
            "opack" => Some(Self::Opack),
            "tlv" => Some(Self::Tlv),
            "archive" => Some(Self::Archive),
            "plist" => Some(Self::Plist),
            _ => None,
        }
    }
}

impl Display for InputFormat {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Opack => write!(fmt, "opack"),
            InputFormat::Tlv => write!(fmt, "tlv"),
            InputFormat::Archive => write!(fmt, "archive"),
            InputFormat::Plist => write!(fmt, "plist"),
        }
    }
}

/// Formats the decoded tree can be written as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xml,
    Json,
    Opack,
}

impl OutputFormat {
    pub fn from_cli(format: &str) -> Option<Self> {
        match format.to_lowercase().as_str() {
            "xml" => Some(Self::Xml),
            "json" => Some(Self::Json),
            "opack" => Some(Self::Opack),
            _ => None,
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Xml => write!(fmt, "xml"),
            OutputFormat::Json => write!(fmt, "json"),
            OutputFormat::Opack => write!(fmt, "opack"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Options {
    /// How to decode the input file
    pub input_format: InputFormat,
    /// How to write the decoded tree
    pub output_format: OutputFormat,
    /// Path to the file to decode
    pub input: PathBuf,
    /// Where to write the result; stdout if `None`
    pub export_path: Option<PathBuf>,
    /// `$top` entry to flatten instead of the default root
    pub top_key: Option<String>,
}

impl Options {
    pub fn from_args(args: &ArgMatches) -> Result<Self, RuntimeError> {
        let input_format: Option<&String> = args.get_one(OPTION_INPUT_FORMAT);
        let output_format: Option<&String> = args.get_one(OPTION_OUTPUT_FORMAT);
        let input: Option<&String> = args.get_one(OPTION_INPUT);
        let export_path: Option<&String> = args.get_one(OPTION_EXPORT_PATH);
        let top_key: Option<&String> = args.get_one(OPTION_TOP_KEY);

        // Ensure the input format is one we can decode
        let input_format = match input_format {
            Some(format) => InputFormat::from_cli(format).ok_or_else(|| {
                RuntimeError::InvalidOptions(format!(
                    "{format} is not a valid input format! Must be one of <{SUPPORTED_INPUT_FORMATS}>"
                ))
            })?,
            None => {
                return Err(RuntimeError::InvalidOptions(format!(
                    "Option --{OPTION_INPUT_FORMAT} is required"
                )))
            }
        };

        // Ensure the output format is one we can write
        let output_format = match output_format {
            Some(format) => OutputFormat::from_cli(format).ok_or_else(|| {
                RuntimeError::InvalidOptions(format!(
                    "{format} is not a valid output format! Must be one of <{SUPPORTED_OUTPUT_FORMATS}>"
                ))
            })?,
            None => OutputFormat::Xml,
        };

        let input = match input {
            Some(path) => PathBuf::from(path),
            None => {
                return Err(RuntimeError::InvalidOptions(format!(
                    "Option --{OPTION_INPUT} is required"
                )))
            }
        };

        // A top key only means something for keyed archives
        if top_key.is_some() && input_format != InputFormat::Archive {
            return Err(RuntimeError::InvalidOptions(format!(
                "Option --{OPTION_TOP_KEY} is enabled, which requires `--{OPTION_INPUT_FORMAT} archive`"
            )));
        }

        Ok(Options {
            input_format,
            output_format,
            input,
            export_path: export_path.map(PathBuf::from),
            top_key: top_key.cloned(),
        })
    }
}

/// Build the command line interface
pub fn get_command() -> Command {
    Command::new("glue-inspect")
        .version(crate_version!())
        .about(crate_description!())
        .long_about(ABOUT)
        .arg_required_else_help(true)
        .arg(
            Arg::new(OPTION_INPUT_FORMAT)
                .short('f')
                .long(OPTION_INPUT_FORMAT)
                .help(format!("Specify the format of the input file\nMust be one of <{SUPPORTED_INPUT_FORMATS}>"))
                .display_order(0)
                .value_name(SUPPORTED_INPUT_FORMATS),
        )
        .arg(
            Arg::new(OPTION_OUTPUT_FORMAT)
                .short('o')
                .long(OPTION_OUTPUT_FORMAT)
                .help(format!("Specify the output format\nMust be one of <{SUPPORTED_OUTPUT_FORMATS}>\nIf omitted, the default is `xml`\n"))
                .display_order(1)
                .value_name(SUPPORTED_OUTPUT_FORMATS),
        )
        .arg(
            Arg::new(OPTION_INPUT)
                .short('i')
                .long(OPTION_INPUT)
                .help("Specify the path to the file to decode")
                .display_order(2)
                .value_name("path/to/input"),
        )
        .arg(
            Arg::new(OPTION_EXPORT_PATH)
                .short('e')
                .long(OPTION_EXPORT_PATH)
                .help("Specify a file to write the result to\nIf omitted, the result is written to stdout\n")
                .display_order(3)
                .value_name("path/to/output"),
        )
        .arg(
            Arg::new(OPTION_TOP_KEY)
                .long(OPTION_TOP_KEY)
                .help(format!("Flatten the named `$top` entry of a keyed archive instead of `$0` or `root`\nRequires `--{OPTION_INPUT_FORMAT} archive`\n"))
                .display_order(4)
                .value_name("name")
                .action(ArgAction::Set),
        )
}

/// Parse arguments from the command line
pub fn from_command_line() -> ArgMatches {
    get_command().get_matches()
}
