//! rwio - read, convert and inspect files in any supported format and compression.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rwio::{infer_file_type, Codec, CodecRequest, Content, FileType, WriteMode, WriteOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

fn main() -> Result<()> {
    // Logging is controlled through RUST_LOG
    env_logger::init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("cat", args)) => cat(args),
        Some(("convert", args)) => convert(args),
        Some(("detect", args)) => detect(args),
        _ => unreachable!("subcommand is required"),
    }
}

fn cli() -> Command {
    Command::new("rwio")
        .version(rwio::VERSION)
        .about("Read and write text, JSON, JSON Lines, YAML and docx files")
        .long_about(
            "rwio reads and writes text, JSON, JSON Lines, YAML and docx files, \
             transparently handling bzip2, gzip, xz, zstd, zip and tar compression \
             inferred from the file name.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("cat")
                .about("Print the decoded content of a file")
                .arg(path_arg("path", "File to read"))
                .arg(type_arg("type", "Content type (default: inferred from the name)"))
                .arg(compression_arg("compression", "Codec (default: inferred)")),
        )
        .subcommand(
            Command::new("convert")
                .about("Read a file and write it in another format or compression")
                .arg(path_arg("input", "File to read"))
                .arg(
                    Arg::new("output")
                        .help("File to write")
                        .required(true)
                        .index(2)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(type_arg("from", "Input content type"))
                .arg(type_arg("to", "Output content type"))
                .arg(compression_arg("input-compression", "Input codec"))
                .arg(compression_arg("output-compression", "Output codec"))
                .arg(
                    Arg::new("level")
                        .long("level")
                        .help("Compression level for the output")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    Arg::new("append")
                        .long("append")
                        .help("Append to the output instead of replacing it")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("detect")
                .about("Show the codec and content type inferred from file names")
                .arg(
                    Arg::new("paths")
                        .help("File names to inspect")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .index(1)
        .value_parser(value_parser!(PathBuf))
}

fn type_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help).value_name("TYPE")
}

fn compression_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help).value_name("CODEC")
}

fn file_type_of(args: &ArgMatches, name: &str) -> Result<Option<FileType>> {
    args.get_one::<String>(name)
        .map(|value| value.parse::<FileType>())
        .transpose()
        .with_context(|| format!("Invalid --{name}"))
}

fn codec_of(args: &ArgMatches, name: &str) -> Result<CodecRequest> {
    match args.get_one::<String>(name) {
        Some(value) => value
            .parse::<CodecRequest>()
            .with_context(|| format!("Invalid --{name}")),
        None => Ok(CodecRequest::Infer),
    }
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("Missing <{name}> argument"))
}

fn cat(args: &ArgMatches) -> Result<()> {
    let path = required_path(args, "path")?;
    let content = rwio::read(path, file_type_of(args, "type")?, codec_of(args, "compression")?)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    print_content(&mut out, &content)?;
    out.flush()?;
    Ok(())
}

fn print_content(out: &mut impl Write, content: &Content) -> Result<()> {
    match content {
        Content::Text(text) => out.write_all(text.as_bytes())?,
        Content::Lines(lines) | Content::Docx(lines) => {
            for line in lines {
                writeln!(out, "{line}")?;
            }
        }
        Content::Json(value) | Content::Yaml(value) => {
            writeln!(out, "{}", serde_json::to_string_pretty(value)?)?
        }
        Content::Jsonl(records) => {
            for record in records {
                writeln!(out, "{}", serde_json::to_string(record)?)?;
            }
        }
    }
    Ok(())
}

fn convert(args: &ArgMatches) -> Result<()> {
    let input = required_path(args, "input")?;
    let output = required_path(args, "output")?;

    let content = rwio::read(
        input,
        file_type_of(args, "from")?,
        codec_of(args, "input-compression")?,
    )
    .with_context(|| format!("Failed to read {}", input.display()))?;

    let mut options = WriteOptions::new().compression(codec_of(args, "output-compression")?);
    if args.get_flag("append") {
        options = options.mode(WriteMode::Append);
    }
    if let Some(level) = args.get_one::<u32>("level") {
        options = options.level(*level);
    }

    rwio::write(output, &content, file_type_of(args, "to")?, &options)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!(
        "converted {} ({}) to {}",
        input.display(),
        content.file_type(),
        output.display()
    );
    Ok(())
}

fn detect(args: &ArgMatches) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for path in args.get_many::<PathBuf>("paths").into_iter().flatten() {
        let file_type = infer_file_type(path)
            .map(|file_type| file_type.name())
            .unwrap_or("unknown");
        writeln!(
            out,
            "{}\tcodec={}\ttype={}",
            path.display(),
            Codec::infer(path),
            file_type
        )?;
    }
    out.flush()?;
    Ok(())
}
