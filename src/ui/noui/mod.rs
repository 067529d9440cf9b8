//! 无 UI（命令行）交互入口：选诵读者 → 选章节 → 整章 / 分段 / 经文。

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::base_system::context::Config;
use crate::catalog::chapters::{self, Chapter};
use crate::catalog::reciters::{self, ReciterVariant};
use crate::download::range_support::supports_range;
use crate::prewarm_state;
use crate::third_party::http::AudioTransport;

mod download;

const PAGE_SIZE: usize = 30;

pub fn run(config: &Config, transport: Arc<dyn AudioTransport>) -> Result<()> {
    println!(
        "欢迎使用古兰经音频下载器! v{}\n\
逐节音频来自 everyayah.com，诵读者目录来自 mp3quran.net，经文来自 alquran.cloud。\n\
本项目仅供学习与个人使用。",
        env!("CARGO_PKG_VERSION")
    );

    loop {
        let catalog = ensure_catalog(config, &transport)?;
        if catalog.is_empty() {
            let again = read_line("诵读者目录为空（网络不可用？）。回车重试，q 退出：")?;
            if again.trim().eq_ignore_ascii_case("q") {
                return Ok(());
            }
            prewarm_state::spawn_catalog_load(transport.clone(), config.catalog_url.clone());
            continue;
        }

        let prompt = format!(
            "请输入诵读者关键词（留空列出全部；前缀 r: 只看支持分段下载的；q 退出，默认保存到 {}）：",
            config.default_save_dir().display()
        );
        let input = read_line(&prompt)?;
        let text = input.trim();
        if text.eq_ignore_ascii_case("q") {
            println!("已退出。");
            break;
        }
        let (query, range_only) = match text.strip_prefix("r:") {
            Some(rest) => (rest.trim(), true),
            None => (text, false),
        };

        let matches = reciters::filter_reciters(&catalog, query, range_only);
        let Some(reciter) = pick_reciter(&matches)? else {
            continue;
        };
        let reciter = reciter.clone();

        loop {
            let Some(chapter) = pick_chapter(&reciter)? else {
                break;
            };
            download::chapter_menu(config, &transport, &reciter, chapter)?;
        }
    }

    Ok(())
}

fn ensure_catalog(
    config: &Config,
    transport: &Arc<dyn AudioTransport>,
) -> Result<Arc<Vec<ReciterVariant>>> {
    if !prewarm_state::is_loaded() && !prewarm_state::is_prewarm_in_progress() {
        prewarm_state::spawn_catalog_load(transport.clone(), config.catalog_url.clone());
    }
    if prewarm_state::is_prewarm_in_progress() {
        println!("正在加载诵读者目录...");
        prewarm_state::wait_ready(Duration::from_secs(120));
    }
    Ok(prewarm_state::catalog())
}

fn pick_reciter<'a>(list: &[&'a ReciterVariant]) -> Result<Option<&'a ReciterVariant>> {
    if list.is_empty() {
        println!("未找到匹配的诵读者\n");
        return Ok(None);
    }

    println!("\n===== 诵读者 =====");
    for (idx, r) in list.iter().enumerate().take(PAGE_SIZE) {
        println!(
            "{}. {} | {} | {} 章{}",
            idx + 1,
            r.name,
            r.narration_name,
            r.total_chapter_count,
            if supports_range(r) { " | 支持分段" } else { "" }
        );
    }
    if list.len() > PAGE_SIZE {
        println!("... 共 {} 项，仅显示前 {} 项，请缩小关键词", list.len(), PAGE_SIZE);
    }
    println!("0. 返回\n");

    let choice = read_line("请输入编号：")?;
    Ok(parse_index(choice.trim(), list.len().min(PAGE_SIZE)).map(|i| list[i]))
}

fn pick_chapter(reciter: &ReciterVariant) -> Result<Option<&'static Chapter>> {
    let available = chapters::available_chapters(reciter);
    if available.is_empty() {
        println!("该诵读版本没有可用章节\n");
        return Ok(None);
    }

    let query = read_line(&format!(
        "\n[{} - {}] 共 {} 章。输入章节关键词或编号（留空列出全部，q 返回）：",
        reciter.name,
        reciter.narration_name,
        available.len()
    ))?;
    let query = query.trim();
    if query.eq_ignore_ascii_case("q") {
        return Ok(None);
    }

    let found = chapters::filter_chapters(&available, query);
    match found.as_slice() {
        [] => {
            println!("未找到匹配的章节\n");
            Ok(None)
        }
        [only] => Ok(Some(*only)),
        many => {
            for c in many {
                println!(
                    "{:>3}. {} ({}) | {} 节",
                    c.id, c.arabic_name, c.english_name, c.ayah_count
                );
            }
            let choice = read_line("请输入章节编号（0 返回）：")?;
            let choice = choice.trim();
            Ok(choice
                .parse::<u32>()
                .ok()
                .and_then(|id| many.iter().copied().find(|c| c.id == id)))
        }
    }
}

/// 1 起始的编号转成下标；0、q 或越界返回 `None`。
fn parse_index(input: &str, len: usize) -> Option<usize> {
    let n = input.parse::<usize>().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

pub(crate) fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(line)
}
