//! eal-page - Drive the Empower Ability Labs page from the command line
//!
//! ```text
//! eal-page <page.html> [--url URL] [--config site.toml]
//! ```
//!
//! Commands are read from stdin, one per line:
//! `click <id>`, `key <Key> [shift]`, `back`, `forward`, `type <id> <text>`,
//! `check <id> on|off`, `blur <id>`, `submit <id>`, `state`.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use eal_dom::{Key, KeyModifiers, NodeId};
use eal_page::{Page, SiteConfig};
use tracing_subscriber::EnvFilter;

struct Args {
    page: String,
    url: Option<String>,
    config: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut page = None;
    let mut url = None;
    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--url" => url = Some(args.next().context("--url needs a value")?),
            "--config" => config = Some(args.next().context("--config needs a value")?),
            _ if page.is_none() => page = Some(arg),
            other => bail!("unexpected argument {:?}", other),
        }
    }
    let page = page.context("usage: eal-page <page.html> [--url URL] [--config site.toml]")?;
    Ok(Args { page, url, config })
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };
    let html = std::fs::read_to_string(&args.page)
        .with_context(|| format!("failed to read {}", args.page))?;
    let url = match args.url {
        Some(url) => url,
        None => {
            let path = std::fs::canonicalize(&args.page)?;
            url::Url::from_file_path(&path)
                .map_err(|_| anyhow::anyhow!("cannot build a URL for {}", path.display()))?
                .to_string()
        }
    };

    let mut page = Page::load(&html, &url, config)?;
    page.on_switch_change(|node, detail| {
        tracing::info!("empower:switch on {} checked={}", node, detail.checked);
    });
    print_state(&page)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match run_command(&mut page, line) {
            Ok(()) => print_state(&page)?,
            Err(e) => eprintln!("error: {:#}", e),
        }
    }
    Ok(())
}

fn run_command(page: &mut Page, line: &str) -> Result<()> {
    let mut parts = line.splitn(3, ' ');
    let command = parts.next().unwrap_or_default();
    let arg = parts.next();
    let rest = parts.next();

    match command {
        "click" => {
            let n = element_arg(page, arg)?;
            page.click(n);
        }
        "key" => {
            let key = Key::parse(arg.context("missing key")?);
            let modifiers = match rest {
                Some("shift") => KeyModifiers::SHIFT,
                Some(other) => bail!("unknown modifier {:?}", other),
                None => KeyModifiers::NONE,
            };
            page.key_down(key, modifiers);
        }
        "back" => {
            if !page.back() {
                bail!("no previous history entry");
            }
        }
        "forward" => {
            if !page.forward() {
                bail!("no next history entry");
            }
        }
        "type" => {
            let n = element_arg(page, arg)?;
            page.type_text(n, rest.unwrap_or_default())?;
        }
        "check" => {
            let n = element_arg(page, arg)?;
            let checked = match rest {
                Some("on") => true,
                Some("off") => false,
                _ => bail!("expected on or off"),
            };
            page.set_checked(n, checked)?;
        }
        "blur" => {
            let n = element_arg(page, arg)?;
            page.blur(n);
        }
        "submit" => {
            let n = element_arg(page, arg)?;
            page.submit(n);
        }
        "state" => {}
        other => bail!("unknown command {:?}", other),
    }
    Ok(())
}

fn element_arg(page: &Page, arg: Option<&str>) -> Result<NodeId> {
    let id = arg.context("missing element id")?;
    Ok(page.element(id)?)
}

/// `tag#id.class` for an element
fn describe(page: &Page, node: NodeId) -> String {
    let Some(el) = page.document().tree().element(node) else {
        return node.to_string();
    };
    let mut out = el.tag.clone();
    if let Some(id) = el.id() {
        out.push('#');
        out.push_str(id);
    }
    if let Some(class) = el.get_attr("class") {
        for c in class.split_whitespace() {
            out.push('.');
            out.push_str(c);
        }
    }
    out
}

fn print_state(page: &Page) -> Result<()> {
    let mut out = io::stdout().lock();
    let focused = page.active_element()
        .map(|n| describe(page, n))
        .unwrap_or_else(|| "(none)".into());
    writeln!(
        out,
        "route={} title={:?} url={} focus={} modal={}",
        page.current_route().unwrap_or("-"),
        page.title(),
        page.url(),
        focused,
        if page.is_modal_open() { "open" } else { "closed" },
    )?;
    Ok(())
}
