use std::sync::OnceLock;
use clap::{ArgAction, ColorChoice, CommandFactory, Parser, ValueEnum};
use clap_complete::Shell;
use comfy_table::{ContentArrangement, Table};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};

mod adl;
mod board;
mod cache;
mod chain;
mod cpu;
mod dxgi;
mod gpu;
mod ids;
mod igcl;
mod memory;
mod nvapi;
mod nvgpu;
mod report;
mod vendors;
#[cfg(windows)]
mod wmi_util;

static ENABLE_COLOR: OnceLock<bool> = OnceLock::new();

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
enum OutputFmt { Text, Json }

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
enum Section { Cpu, Board, Memory, Graphics }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

#[derive(Parser, Debug)]
#[command(
    name = "hwsheet",
    about = "Hardware inventory reporter",
    long_about = "Hardware inventory reporter that identifies the CPU, mainboard, memory and graphics adapter through CPUID, WMI, the registry and the vendor GPU libraries.",
    after_long_help = "Examples:\n  hwsheet\n  hwsheet --sections cpu,graphics\n  hwsheet --output json --json-path inventory.json\n  hwsheet --text-format table --no-color\n  hwsheet -vv --log-path hwsheet.log",
    color = ColorChoice::Auto
)]
struct Args {
    #[arg(long, short = 'o', value_enum, default_value = "text")]
    output: OutputFmt,
    #[arg(long, value_enum, default_value = "lines")]
    text_format: TextFormat,
    #[arg(long, short = 's', num_args = 0.., value_delimiter = ',')]
    sections: Vec<Section>,
    #[arg(long, short = 'j')]
    json_path: Option<String>,
    #[arg(long, short = 'C', default_value_t = false)]
    no_color: bool,
    #[arg(long, default_value_t = false)]
    force_color: bool,
    #[arg(long, default_value_t = false)]
    no_header: bool,
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
    #[arg(short = 'q', long, default_value_t = false)]
    quiet: bool,
    #[arg(long)]
    log_level: Option<LogLevel>,
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
    #[arg(long)]
    log_path: Option<String>,
    #[arg(long, value_enum)]
    completions: Option<Shell>,
    #[arg(long)]
    completions_out: Option<String>,
    #[arg(long)]
    config: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            output: OutputFmt::Text,
            text_format: TextFormat::Lines,
            sections: vec![],
            json_path: None,
            no_color: false,
            force_color: false,
            no_header: false,
            verbose: 0,
            quiet: false,
            log_level: None,
            log_format: None,
            log_path: None,
            completions: None,
            completions_out: None,
            config: None,
        }
    }
}

#[derive(Deserialize)]
struct AppConfig {
    output: Option<OutputFmt>,
    text_format: Option<TextFormat>,
    sections: Option<Vec<Section>>,
    json_path: Option<String>,
    no_header: Option<bool>,
    force_color: Option<bool>,
    log_format: Option<LogFormat>,
    log_path: Option<String>,
}

fn main() {
    let mut args = Args::parse();
    if let Some(sh) = args.completions {
        let mut cmd = Args::command();
        if let Some(path) = args.completions_out.as_ref() {
            if let Ok(mut f) = std::fs::File::create(path) { clap_complete::generate(sh, &mut cmd, "hwsheet", &mut f); } else { clap_complete::generate(sh, &mut cmd, "hwsheet", &mut std::io::stdout()); }
        } else {
            clap_complete::generate(sh, &mut cmd, "hwsheet", &mut std::io::stdout());
        }
        return;
    }
    if let Some(p) = args.config.as_ref()
        && let Ok(s) = std::fs::read_to_string(p)
        && let Ok(cfg) = toml::from_str::<AppConfig>(&s) { apply_config(&mut args, cfg); }
    else {
        let def = "hwsheet.toml";
        if let Ok(s) = std::fs::read_to_string(def)
            && let Ok(cfg) = toml::from_str::<AppConfig>(&s) { apply_config(&mut args, cfg); }
    }
    {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if args.quiet {
            builder.filter_level(log::LevelFilter::Error);
        } else if let Some(lvl) = args.log_level {
            let f = match lvl { LogLevel::Error => log::LevelFilter::Error, LogLevel::Warn => log::LevelFilter::Warn, LogLevel::Info => log::LevelFilter::Info, LogLevel::Debug => log::LevelFilter::Debug, LogLevel::Trace => log::LevelFilter::Trace };
            builder.filter_level(f);
        } else if args.verbose > 0 {
            let f = if args.verbose >= 3 { log::LevelFilter::Trace } else if args.verbose == 2 { log::LevelFilter::Debug } else { log::LevelFilter::Info };
            builder.filter_level(f);
        }
        if let Some(fmt) = args.log_format {
            match fmt {
                LogFormat::Json => {
                    builder.format(|buf, record| {
                        use std::io::Write;
                        let ts = chrono::Local::now().to_rfc3339();
                        let obj = serde_json::json!({
                            "ts": ts,
                            "level": record.level().to_string(),
                            "target": record.target(),
                            "msg": record.args().to_string(),
                        });
                        writeln!(buf, "{}", obj)
                    });
                }
                LogFormat::Text => {
                    builder.format(|buf, record| {
                        use std::io::Write;
                        let ts = chrono::Local::now().format("%H:%M:%S");
                        writeln!(buf, "[{:<5} {}] {}", record.level(), ts, record.args())
                    });
                }
            }
        }
        if let Some(path) = args.log_path.as_ref() {
            match std::fs::File::create(path) {
                Ok(f) => {
                    builder.target(env_logger::Target::Pipe(Box::new(f)));
                }
                Err(e) => {
                    eprintln!("Failed to open log file {}: {}", path, e);
                }
            }
        }
        builder.init();
    }
    let term = std::env::var("TERM").unwrap_or_default();
    let no_color_env = std::env::var_os("NO_COLOR").is_some();
    let color_default = std::io::stdout().is_terminal() && !no_color_env && term != "dumb";
    let enable_color = if args.force_color { true } else { color_default && !args.no_color };
    let _ = ENABLE_COLOR.set(enable_color);

    let sections = selected_sections(&args);
    let rep = collect_report(&sections);

    match args.output {
        OutputFmt::Text => {
            match args.text_format {
                TextFormat::Lines => print_text(&rep, args.no_header),
                TextFormat::Table => print_text_table(&rep, args.no_header),
            }
        },
        OutputFmt::Json => {
            let body = serde_json::to_string_pretty(&rep).unwrap_or_default();
            if let Some(p) = args.json_path.as_ref() {
                match std::fs::write(p, body) {
                    Ok(_) => { if !args.quiet { println!("{}", paint(&format!("JSON written: {}", p), "1;36")); } },
                    Err(e) => log::error!("JSON write failed for {}: {}", p, e),
                }
            } else if !args.quiet { println!("{}", body); }
        }
    }
}

fn apply_config(args: &mut Args, cfg: AppConfig) {
    if let Some(v) = cfg.output { args.output = v; }
    if let Some(v) = cfg.text_format { args.text_format = v; }
    if args.sections.is_empty() && let Some(v) = cfg.sections { args.sections = v; }
    if args.json_path.is_none() && let Some(v) = cfg.json_path { args.json_path = Some(v); }
    if let Some(v) = cfg.no_header { args.no_header = v; }
    if let Some(v) = cfg.force_color { args.force_color = v; }
    if args.log_format.is_none() && let Some(v) = cfg.log_format { args.log_format = Some(v); }
    if args.log_path.is_none() && let Some(v) = cfg.log_path { args.log_path = Some(v); }
}

fn selected_sections(args: &Args) -> Vec<Section> {
    if args.sections.is_empty() {
        vec![Section::Cpu, Section::Board, Section::Memory, Section::Graphics]
    } else {
        args.sections.clone()
    }
}

fn collect_report(sections: &[Section]) -> report::HardwareReport {
    let want = |s: Section| sections.contains(&s);
    let cpu = want(Section::Cpu).then(|| {
        log::info!("collecting CPU section");
        report::collect_cpu()
    });
    let mainboard = want(Section::Board).then(|| {
        log::info!("collecting mainboard section");
        report::collect_board()
    });
    let memory = want(Section::Memory).then(|| {
        log::info!("collecting memory section");
        report::collect_memory()
    });
    let graphics = want(Section::Graphics).then(|| {
        log::info!("collecting graphics section");
        report::collect_graphics()
    });
    report::HardwareReport {
        generated: chrono::Local::now().to_rfc3339(),
        cpu,
        mainboard,
        memory,
        graphics,
    }
}

fn show(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("Unknown")
}

/// Vendor-exclusive attributes read "N/A" when no SDK answered, to keep
/// them apart from attributes every machine should have.
fn show_na(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("N/A")
}

fn show_num(v: Option<u32>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "Unknown".to_string())
}

fn section_rows(rep: &report::HardwareReport) -> Vec<(&'static str, Vec<(String, String)>)> {
    let mut out = Vec::new();
    if let Some(c) = rep.cpu.as_ref() {
        let mut rows = vec![
            ("CPU Vendor".to_string(), show(&c.vendor).to_string()),
            ("CPU Name".to_string(), show(&c.brand).to_string()),
            ("Family".to_string(), show_num(c.family)),
            ("Model".to_string(), show_num(c.model)),
            ("Stepping".to_string(), show_num(c.stepping)),
            ("Cores".to_string(), show_num(c.physical_cores)),
            ("Threads".to_string(), show_num(c.logical_processors)),
            ("Core Speed".to_string(), show(&c.current_clock).to_string()),
            ("Max Speed".to_string(), show(&c.max_clock).to_string()),
            ("Speed Limit".to_string(), show(&c.clock_limit).to_string()),
        ];
        for row in &c.caches {
            rows.push((row.label.to_string(), row.describe()));
        }
        out.push(("CPU", rows));
    }
    if let Some(b) = rep.mainboard.as_ref() {
        let mut rows = vec![
            ("Manufacturer".to_string(), show(&b.manufacturer).to_string()),
            ("Model".to_string(), show(&b.model).to_string()),
            ("Bus Specs".to_string(), b.bus_specs.clone()),
            ("BIOS Brand".to_string(), show(&b.bios_brand).to_string()),
            ("BIOS Version".to_string(), show(&b.bios_version).to_string()),
            ("BIOS Date".to_string(), show(&b.bios_date).to_string()),
        ];
        for row in &b.chipset {
            rows.push((
                row.label.to_string(),
                format!("{} {} {}", row.vendor, row.model, row.revision),
            ));
        }
        out.push(("Mainboard", rows));
    }
    if let Some(m) = rep.memory.as_ref() {
        out.push(("Memory", vec![
            ("Type".to_string(), show(&m.kind).to_string()),
            ("Size".to_string(), show(&m.size).to_string()),
            ("Channels".to_string(), show(&m.channels).to_string()),
            ("DRAM Frequency".to_string(), show(&m.frequency).to_string()),
        ]));
    }
    if let Some(g) = rep.graphics.as_ref() {
        out.push(("Graphics", vec![
            ("Name".to_string(), show(&g.name).to_string()),
            ("Board Manufacturer".to_string(), show(&g.board_manufacturer).to_string()),
            ("TDP".to_string(), show_na(&g.tdp).to_string()),
            ("Base Clock".to_string(), show(&g.base_clock).to_string()),
            ("Memory Size".to_string(), show(&g.vram_size).to_string()),
            ("Memory Type".to_string(), show(&g.vram_type).to_string()),
            ("Memory Vendor".to_string(), show_na(&g.vram_vendor).to_string()),
            ("Bus Width".to_string(), show(&g.vram_bus_width).to_string()),
        ]));
    }
    out
}

fn print_text(rep: &report::HardwareReport, no_header: bool) {
    if !no_header { println!("{}", paint(&format!("hwsheet report ({})", rep.generated), "1;36")); }
    for (title, rows) in section_rows(rep) {
        println!("{}", paint(&format!("| ------------------ {} ------------------", title), "1"));
        for (label, value) in rows {
            println!("| {:<18} : {}", label, value);
        }
    }
}

fn print_text_table(rep: &report::HardwareReport, no_header: bool) {
    if !no_header { println!("{}", paint(&format!("hwsheet report ({})", rep.generated), "1;36")); }
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![paint("Section", "1"), paint("Item", "1"), paint("Value", "1")]);
    for (title, rows) in section_rows(rep) {
        for (label, value) in rows {
            table.add_row(vec![title.to_string(), label, value]);
        }
    }
    println!("{}", table);
}

fn paint(s: &str, code: &str) -> String {
    if *ENABLE_COLOR.get().unwrap_or(&true) { format!("\x1b[{}m{}\x1b[0m", code, s) } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::default()
    }

    fn empty_config() -> AppConfig {
        AppConfig {
            output: None,
            text_format: None,
            sections: None,
            json_path: None,
            no_header: None,
            force_color: None,
            log_format: None,
            log_path: None,
        }
    }

    #[test]
    fn default_sections_are_all_four() {
        let a = base_args();
        let s = selected_sections(&a);
        assert_eq!(s, vec![Section::Cpu, Section::Board, Section::Memory, Section::Graphics]);
    }

    #[test]
    fn explicit_sections_win() {
        let mut a = base_args();
        a.sections = vec![Section::Graphics];
        assert_eq!(selected_sections(&a), vec![Section::Graphics]);
    }

    #[test]
    fn config_fills_empty_sections_only() {
        let mut a = base_args();
        let mut cfg = empty_config();
        cfg.sections = Some(vec![Section::Memory]);
        apply_config(&mut a, cfg);
        assert_eq!(a.sections, vec![Section::Memory]);

        let mut a = base_args();
        a.sections = vec![Section::Cpu];
        let mut cfg = empty_config();
        cfg.sections = Some(vec![Section::Memory]);
        apply_config(&mut a, cfg);
        assert_eq!(a.sections, vec![Section::Cpu]);
    }

    #[test]
    fn config_keeps_cli_json_path() {
        let mut a = base_args();
        a.json_path = Some("cli.json".to_string());
        let mut cfg = empty_config();
        cfg.json_path = Some("cfg.json".to_string());
        apply_config(&mut a, cfg);
        assert_eq!(a.json_path.as_deref(), Some("cli.json"));
    }

    #[test]
    fn unknown_and_na_fallbacks() {
        assert_eq!(show(&None), "Unknown");
        assert_eq!(show(&Some("AMD".to_string())), "AMD");
        assert_eq!(show_na(&None), "N/A");
        assert_eq!(show_num(None), "Unknown");
        assert_eq!(show_num(Some(8)), "8");
    }

    #[test]
    fn report_skips_unselected_sections() {
        let rep = collect_report(&[Section::Memory]);
        assert!(rep.cpu.is_none());
        assert!(rep.mainboard.is_none());
        assert!(rep.memory.is_some());
        assert!(rep.graphics.is_none());
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
enum TextFormat { Lines, Table }
#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
enum LogFormat { Text, Json }
