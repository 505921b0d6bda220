use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use riak_core::config::Config;
use riak_core::core_crdt::{DtFetchConverter, DtUpdateConverter};
use riak_core::core_proto::{
    server_error, DeleteConverter, FetchObjectConverter, PingConverter, ServerInfoConverter,
    StoreObjectConverter,
};
use riak_core::logging::{init_logging_with_config, LogLevel};
use riak_core::{DatatypeKind, MessageCode, ProtocolMessage, ResponseConverter};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{debug, info};

mod render;

#[derive(Parser, Debug)]
#[command(name = "riak-decode")]
#[command(author, version, about = "Decode captured Riak protocol buffer responses", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error); overrides the config
    #[arg(short, long)]
    log_level: Option<LogLevel>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// TOML config file; RIAK_* environment variables are used otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Decode one or more length-prefixed frames
    Frame {
        /// Frame bytes as hex
        hex: String,
    },
    /// Decode a DtFetchResp payload
    Fetch {
        /// Payload bytes as hex
        hex: String,

        /// Fail unless the response holds this datatype
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
    /// Decode a DtUpdateResp payload
    Update {
        /// Payload bytes as hex
        hex: String,

        /// Fail unless the returned body holds this datatype
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Counter,
    Set,
    Map,
}

impl From<KindArg> for DatatypeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Counter => DatatypeKind::Counter,
            KindArg::Set => DatatypeKind::Set,
            KindArg::Map => DatatypeKind::Map,
        }
    }
}

/// Hex with optional `0x` prefix; whitespace is ignored
fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let compact: String = input.split_whitespace().collect();
    let digits = compact.strip_prefix("0x").unwrap_or(&compact);
    hex::decode(digits).with_context(|| format!("invalid hex input ({} digits)", digits.len()))
}

fn decode_with<C: ResponseConverter>(
    message: &ProtocolMessage,
    converter: &C,
    render: impl FnOnce(C::Output) -> Value,
) -> Value {
    match message.convert_response(converter) {
        Ok(output) => render(output),
        Err(e) => render::error(&e),
    }
}

/// Decode a single message with the converter its code selects
fn decode_message(message: &ProtocolMessage, config: &Config) -> Value {
    let depth = config.decode.max_map_depth;
    let body = match message.message_code() {
        Some(MessageCode::ErrorResp) => render::error(&server_error(message.payload())),
        Some(MessageCode::PingResp) => decode_with(message, &PingConverter, |_| json!("pong")),
        Some(MessageCode::GetServerInfoResp) => {
            decode_with(message, &ServerInfoConverter, |info| render::server_info(&info))
        }
        Some(MessageCode::GetResp) => {
            decode_with(message, &FetchObjectConverter, |fetched| render::fetched_object(&fetched))
        }
        Some(MessageCode::PutResp) => {
            decode_with(message, &StoreObjectConverter, |stored| render::stored_object(&stored))
        }
        Some(MessageCode::DelResp) => decode_with(message, &DeleteConverter, |_| json!("deleted")),
        Some(MessageCode::DtFetchResp) => match message
            .convert_response(&config.decode.fetch_converter())
            .and_then(|fetched| render::fetched(fetched, depth))
        {
            Ok(value) => value,
            Err(e) => render::error(&e),
        },
        Some(MessageCode::DtUpdateResp) => match message
            .convert_response(&config.decode.update_converter())
            .and_then(|updated| render::updated(updated, depth))
        {
            Ok(value) => value,
            Err(e) => render::error(&e),
        },
        Some(_) | None => json!({ "payload": hex::encode(message.payload()) }),
    };

    json!({
        "code": message.code(),
        "name": message.message_code().map(|c| c.name()),
        "payload_len": message.payload().len(),
        "body": body,
    })
}

fn run(command: Command, config: &Config) -> Result<Value> {
    let depth = config.decode.max_map_depth;

    match command {
        Command::Frame { hex } => {
            let bytes = parse_hex(&hex)?;
            let messages = ProtocolMessage::decode_frames(&bytes, config.decode.max_frame_size)?;
            info!(frames = messages.len(), "decoded frames");
            Ok(Value::Array(messages.iter().map(|m| decode_message(m, config)).collect()))
        }
        Command::Fetch { hex, kind } => {
            let payload = parse_hex(&hex)?;
            let fetched = DtFetchConverter::with_max_depth(depth)
                .convert(MessageCode::DtFetchResp.as_u8(), &payload)?;
            if let Some(kind) = kind.map(DatatypeKind::from) {
                if fetched.kind != kind {
                    bail!("response holds a {}, not a {}", fetched.kind, kind);
                }
            }
            Ok(render::fetched(fetched, depth)?)
        }
        Command::Update { hex, kind } => {
            let payload = parse_hex(&hex)?;
            let converter = match kind {
                Some(kind) => DtUpdateConverter::for_kind(kind.into()),
                None => DtUpdateConverter::new(),
            };
            let updated = converter.with_max_depth(depth).convert(MessageCode::DtUpdateResp.as_u8(), &payload)?;
            Ok(render::updated(updated, depth)?)
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    init_logging_with_config(config.logging.clone())?;
    debug!(?config, "configuration loaded");

    let output = run(args.command, &config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
