use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use crate::base_system::context::Config;
use crate::catalog::chapters::Chapter;
use crate::catalog::reciters::ReciterVariant;
use crate::catalog::text;
use crate::download::assembler::RangeAssembler;
use crate::download::full_chapter;
use crate::download::models::{DownloadOutcome, RangeRequest};
use crate::download::progress::ProgressReporter;
use crate::download::range_support::supports_range;
use crate::download::save;
use crate::third_party::http::AudioTransport;

pub(super) fn chapter_menu(
    config: &Config,
    transport: &Arc<dyn AudioTransport>,
    reciter: &ReciterVariant,
    chapter: &Chapter,
) -> Result<()> {
    let ranged = supports_range(reciter);
    println!(
        "\n{} ({}) | {} 节 | {:?}",
        chapter.arabic_name, chapter.english_name, chapter.ayah_count, chapter.revelation
    );
    println!("播放地址: {}", full_chapter::chapter_url(reciter, chapter.id));
    println!("1. 下载整章");
    if ranged {
        println!("2. 按节范围下载");
    }
    println!("3. 查看经文");
    println!("0. 返回\n");

    let choice = super::read_line("请选择：")?;
    match choice.trim() {
        "1" => download_full(config, transport.as_ref(), reciter, chapter),
        "2" if ranged => download_range(config, transport, reciter, chapter),
        "3" => {
            show_text(config, transport.as_ref(), chapter);
            Ok(())
        }
        _ => Ok(()),
    }
}

fn download_full(
    config: &Config,
    transport: &dyn AudioTransport,
    reciter: &ReciterVariant,
    chapter: &Chapter,
) -> Result<()> {
    println!("开始下载整章...");
    let start = Instant::now();
    let outcome = full_chapter::download_outcome(transport, reciter, chapter);
    finish(config, outcome, start)
}

fn download_range(
    config: &Config,
    transport: &Arc<dyn AudioTransport>,
    reciter: &ReciterVariant,
    chapter: &Chapter,
) -> Result<()> {
    let input = super::read_line(&format!(
        "输入节范围 形如 1-{}（起始-结束）：",
        chapter.ayah_count
    ))?;
    let Some((start_ayah, end_ayah)) = parse_range(input.trim()) else {
        println!("范围格式错误，应为 a-b\n");
        return Ok(());
    };

    let request = RangeRequest::new(reciter.clone(), *chapter, start_ayah, end_ayah);
    let mut assembler = RangeAssembler::from_config(transport.clone(), config);
    let mut reporter = ProgressReporter::new(config.show_progress_bar, None);

    let start = Instant::now();
    let outcome = assembler.run(&request, |event| reporter.on_event(event));
    drop(reporter);
    assembler.reset();
    finish(config, outcome, start)
}

fn finish(config: &Config, outcome: DownloadOutcome, start: Instant) -> Result<()> {
    match outcome {
        DownloadOutcome::Success {
            blob,
            suggested_filename,
        } => {
            let path = save::save(
                &blob,
                &suggested_filename,
                &config.default_save_dir(),
                config.allow_overwrite_files,
            )?;
            println!(
                "下载完成: {}（{:.1} 秒）\n",
                path.display(),
                start.elapsed().as_secs_f32()
            );
        }
        DownloadOutcome::Failure { reason } => {
            println!("{}\n({})\n", reason.user_message(), reason);
        }
    }
    Ok(())
}

fn show_text(config: &Config, transport: &dyn AudioTransport, chapter: &Chapter) {
    match text::fetch(transport, &config.chapter_text_url, chapter.id) {
        Some(body) => {
            println!("\n===== {} =====", body.name);
            for (n, line) in body.display_ayahs() {
                println!("({n}) {line}");
            }
            println!();
        }
        None => println!("经文获取失败\n"),
    }
}

/// `a-b`、`a~b` 或单个 `a`；只做语法解析，越界交给状态机判定。
fn parse_range(input: &str) -> Option<(u32, u32)> {
    let (a, b) = match input.split_once(['-', '~']) {
        Some((a, b)) => (a, b),
        None => (input, input),
    };
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}
