use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ncad_config::{AppConfig, ConfigError, FrontendMode};
use ncad_frontend::RunOptions;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// nanoCAD 命令语言解释器。
#[derive(Debug, Parser)]
#[command(name = "ncad", version, about)]
struct Cli {
    /// 要回放的命令文件；省略时进入交互会话。
    source: Option<PathBuf>,

    /// 显式指定配置文件。
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 回放完成后进入交互会话。
    #[arg(short, long)]
    interactive: bool,

    /// 在后台线程渲染并在结束时输出绘制记录。
    #[arg(long)]
    render: bool,

    /// 结束时以 JSON 输出文档。
    #[arg(long)]
    dump: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = load_configuration(cli.config.clone());
    init_logging(&config);
    info!("启动 nanoCAD 解释器");

    let mut options = RunOptions::from_config(&config);
    options.source = cli.source;
    options.render |= cli.render;
    options.dump_json |= cli.dump;
    if cli.interactive || options.source.is_none() {
        options.mode = FrontendMode::Interactive;
    }

    match ncad_frontend::run(&options, &config) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            error!(error = %err, "运行失败");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
