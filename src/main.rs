//! # 图片放大镜：命令行探针
//!
//! 本文件只负责参数解析、日志初始化与组装各子系统，
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。
//!
//! ```text
//! magnifier-probe scene.json --x 120 --y 80 --key + --key + --wheel -100 --copy
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use image_magnifier::exporter::{
    ArboardClipboard, BlobRegistry, DirectorySink, NetworkFetcher, PixelExporter,
};
use image_magnifier::geometry::{GeometryProbe, Point};
use image_magnifier::magnifier::{MagnifierController, MagnifierInput, NullHost};
use image_magnifier::resolver::CandidateResolver;
use image_magnifier::scene::Scene;
use image_magnifier::{AppError, MagnifierSettings};

#[derive(Parser, Debug)]
#[command(
    name = "magnifier-probe",
    version,
    about = "解析场景中光标下的最佳图片，驱动放大层并可选导出"
)]
struct Cli {
    /// 场景 JSON 文件。
    scene: PathBuf,

    /// 光标视口横坐标。
    #[arg(long, allow_negative_numbers = true)]
    x: f64,

    /// 光标视口纵坐标。
    #[arg(long, allow_negative_numbers = true)]
    y: f64,

    /// 设置文件（JSON），缺省使用内置默认值。
    #[arg(long)]
    config: Option<PathBuf>,

    /// 依次发送给放大层的按键（`+` / `-` / `Escape`）。
    #[arg(long = "key")]
    keys: Vec<String>,

    /// 以图片中心为锚点依次发送的滚轮增量。
    #[arg(long = "wheel", allow_negative_numbers = true)]
    wheel: Vec<f64>,

    /// 打印全部候选排名。
    #[arg(long)]
    all: bool,

    /// 把选中的图片无损复制到剪贴板。
    #[arg(long)]
    copy: bool,

    /// 把选中的图片保存到该目录。
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// 把显示中的图片视为跨域未授权，强制走重新获取回退。
    #[arg(long)]
    cross_origin: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_silent() => {
            log::info!("🫥 光标下没有图片，放大层不打开");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("❌ [{}] {}", err.code(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut settings = match &cli.config {
        Some(path) => MagnifierSettings::load(path)?,
        None => MagnifierSettings::default(),
    };

    let scene = Scene::load(&cli.scene)?;
    if settings.resolver.base_url.is_none() {
        settings.resolver.base_url = scene.base_url.clone();
    }

    let tree = scene.build_tree();
    let resolver = CandidateResolver::new(settings.resolver.clone())?;
    let point = Point::new(cli.x, cli.y);

    if cli.all {
        let stack = tree.stack_at(point);
        for (rank, candidate) in resolver.rank(&tree, &stack).iter().enumerate() {
            println!(
                "#{} {:>8.1} {:<10} {}",
                rank + 1,
                candidate.score,
                format!("{:?}", candidate.origin),
                candidate.url
            );
        }
    }

    let candidate = resolver.resolve_at(&tree, point)?;
    println!("url: {}", candidate.url);

    let mut controller = MagnifierController::new(NullHost, settings.zoom.clone())?;
    controller.open(candidate.url.clone())?;

    for key in &cli.keys {
        match MagnifierInput::from_key(key) {
            Some(input) => controller.handle(input)?,
            None => log::warn!("⚠️ 忽略未知按键：{}", key),
        }
    }
    for delta in &cli.wheel {
        if controller.is_open() {
            controller.wheel_zoom(*delta, Point::ORIGIN)?;
        }
    }

    if let Some(state) = controller.state() {
        println!("zoom: {:.3}", state.zoom());
        println!("transform: {}", state.transform().to_css());
    } else {
        println!("closed");
    }

    if cli.copy || cli.save_dir.is_some() {
        export(&cli, &settings, &scene, &candidate.url).await?;
    }

    Ok(())
}

async fn export(
    cli: &Cli,
    settings: &MagnifierSettings,
    scene: &Scene,
    url: &str,
) -> Result<(), AppError> {
    let blobs = BlobRegistry::new();
    let scene_dir = cli.scene.parent().unwrap_or_else(|| Path::new("."));
    scene.register_blobs(&blobs, scene_dir)?;

    let fetcher = Arc::new(NetworkFetcher::new(&settings.export, blobs)?);
    let save_dir = cli.save_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let sink = Arc::new(DirectorySink::new(save_dir, fetcher.clone(), &settings.export));
    let clipboard = Arc::new(ArboardClipboard::new(&settings.export));
    let exporter = PixelExporter::new(settings.export.clone(), fetcher, clipboard, sink)?;

    let displayed = exporter.decode_for_display(url, !cli.cross_origin).await;

    let result = async {
        if cli.copy {
            exporter.copy(&displayed).await?;
            println!("copied");
        }
        if cli.save_dir.is_some() {
            let outcome = exporter.save(&displayed).await?;
            println!(
                "saved: {}",
                outcome
                    .location
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or(outcome.filename)
            );
        }
        Ok::<(), image_magnifier::exporter::ExportError>(())
    }
    .await;

    if let Err(err) = &result {
        eprintln!("{}", err.user_message());
    }
    result.map_err(AppError::from)
}
