use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};

use filtrapx::parser::{self, Dictionary};
use filtrapx::{db, input, pipeline, FilterConfig, NameFilter, NameMode, Record, Sex};

const LISTING_FILE: &str = "resultados.txt";
const SQL_FILE: &str = "resultados.sql";

#[derive(Parser)]
#[command(name = "filtrapx", about = "Extrai, filtra e exporta registros de dumps de bots de consulta")]
struct Cli {
    /// Arquivo ou pasta de entrada (.txt)
    input: Option<PathBuf>,
    /// Usar o ultimo .txt baixado pelo Telegram (Termux)
    #[arg(short, long)]
    termux: bool,
    /// Filtrar por nome
    #[arg(short, long)]
    name: Option<String>,
    /// Modo de comparacao do nome
    #[arg(short, long, value_enum, default_value_t = ModeArg::Exato)]
    mode: ModeArg,
    /// Filtrar por sexo
    #[arg(short, long, value_enum, ignore_case = true)]
    sex: Option<SexArg>,
    /// Idade minima (inclusiva)
    #[arg(long, alias = "min_age")]
    min_age: Option<u32>,
    /// Idade maxima (inclusiva)
    #[arg(long, alias = "max_age")]
    max_age: Option<u32>,
    /// Mostrar resultados no terminal
    #[arg(short, long)]
    print: bool,
    /// Pasta de saida
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,
    /// Palavras extras para o corretor de nomes, uma por linha
    #[arg(long)]
    dict: Option<PathBuf>,
    /// Tambem gravar os registros filtrados neste banco SQLite
    #[arg(long)]
    db: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    #[value(alias = "exact")]
    Exato,
    #[value(alias = "contains")]
    Contem,
    #[value(alias = "starts-with")]
    Comeca,
}

impl From<ModeArg> for NameMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Exato => NameMode::Exact,
            ModeArg::Contem => NameMode::Contains,
            ModeArg::Comeca => NameMode::StartsWith,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SexArg {
    M,
    F,
}

impl From<SexArg> for Sex {
    fn from(value: SexArg) -> Self {
        match value {
            SexArg::M => Sex::Male,
            SexArg::F => Sex::Female,
        }
    }
}

impl Cli {
    fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            name: self.name.as_ref().map(|text| NameFilter {
                text: text.clone(),
                mode: self.mode.into(),
            }),
            sex: self.sex.map(Sex::from),
            age_min: self.min_age,
            age_max: self.max_age,
            print_to_console: self.print,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = cli.filter_config();
    config.validate()?;

    let dict = load_dictionary(cli.dict.as_deref())?;
    let files = input::locate(cli.input.as_deref(), cli.termux)?;
    let today = Local::now().date_naive();

    let records = parse_files(&files, &dict, today)?;
    info!(records = records.len(), files = files.len(), "registros extraidos");
    for r in records.iter().filter(|r| r.missing_fields() >= 3) {
        debug!(block = r.raw_block(), "registro com poucos campos");
    }

    let out = pipeline::filter_and_render(records, &config);
    info!(kept = out.records.len(), "registros apos filtros");

    write_outputs(&cli.out_dir, &out)?;

    if let Some(path) = &cli.db {
        let conn = db::connect(path)?;
        db::init_schema(&conn)?;
        let inserted = db::save_records(&conn, &out.records)?;
        info!(inserted, db = %path.display(), "registros gravados no banco");
    }

    if config.print_to_console {
        if !out.listing.is_empty() {
            println!("{}", out.listing);
        }
        println!("\n{} resultado(s) encontrados.", out.records.len());
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("concluido em {}", format_duration(elapsed));
    }
    Ok(())
}

fn load_dictionary(extra: Option<&Path>) -> Result<Dictionary> {
    let mut dict = Dictionary::builtin();
    if let Some(path) = extra {
        let words = fs::read_to_string(path)
            .with_context(|| format!("lendo dicionario {}", path.display()))?;
        dict.extend_from_word_list(&words);
    }
    debug!(words = dict.len(), "dicionario carregado");
    Ok(dict)
}

/// Each file is its own pipeline; results keep the order of `files`.
fn parse_files(files: &[PathBuf], dict: &Dictionary, today: NaiveDate) -> Result<Vec<Record>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} arquivos")?
            .progress_chars("#>-"),
    );

    let per_file: Vec<Vec<Record>> = files
        .par_iter()
        .map(|path| -> Result<Vec<Record>> {
            let raw = input::read(path)?;
            let text = parser::normalize(&raw, dict);
            let records: Vec<Record> = parser::extract(&text, today).collect();
            debug!(file = %path.display(), records = records.len(), "arquivo processado");
            pb.inc(1);
            Ok(records)
        })
        .collect::<Result<_>>()?;

    pb.finish_and_clear();
    Ok(per_file.into_iter().flatten().collect())
}

/// Both renderings are complete before anything touches the disk.
fn write_outputs(dir: &Path, out: &pipeline::Output) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("criando {}", dir.display()))?;

    let listing_path = dir.join(LISTING_FILE);
    let mut listing = out.listing.clone();
    if !listing.is_empty() {
        listing.push('\n');
    }
    fs::write(&listing_path, listing)
        .with_context(|| format!("gravando {}", listing_path.display()))?;

    let sql_path = dir.join(SQL_FILE);
    fs::write(&sql_path, &out.sql).with_context(|| format!("gravando {}", sql_path.display()))?;

    info!(listing = %listing_path.display(), sql = %sql_path.display(), "arquivos gravados");
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
