use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use ple_sales::aggregate::{AggregateOptions, RowOrder};
use ple_sales::alias::AliasTable;
use ple_sales::export::{self, ExportKind};
use ple_sales::filter::{FilterSpec, YearRange};
use ple_sales::model::{CellValue, PivotAxis, Product};
use ple_sales::session::{DashboardView, Session};
use ple_sales::{Result, SalesError, io::json_write};
use tracing_subscriber::EnvFilter;

const DEFAULT_INPUT: &str = "data/ple_sales.xlsx";

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| SalesError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Summary(args) => execute_summary(args),
        Command::Export(args) => execute_export(args),
    }
}

fn execute_summary(args: SummaryArgs) -> Result<()> {
    let session = open_session(&args.selection)?;
    let view = args.selection.view(&session);
    report_unmapped(&session);

    match args.format {
        OutputFormat::Text => print_text(&view),
        OutputFormat::Json => {
            let document = view.summary_document(session.unmapped_regions());
            println!("{}", json_write::to_json_string(&document)?);
        }
    }
    Ok(())
}

fn execute_export(args: ExportArgs) -> Result<()> {
    let kind = ExportKind::resolve(args.kind.map(ExportKind::from), &args.output)?;
    let session = open_session(&args.selection)?;
    let view = args.selection.view(&session);
    report_unmapped(&session);
    export::export(&view, session.unmapped_regions(), &args.output, kind)?;
    eprintln!("wrote {kind} to {}", args.output.display());
    Ok(())
}

fn open_session(selection: &SelectionArgs) -> Result<Session> {
    let input = selection
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
    if !input.exists() {
        return Err(SalesError::MissingInput(input));
    }

    let aliases = match &selection.aliases {
        Some(path) => load_aliases(path)?,
        None => AliasTable::default(),
    };
    Session::open(&input, aliases)
}

fn load_aliases(path: &Path) -> Result<AliasTable> {
    if !path.exists() {
        return Err(SalesError::MissingInput(path.to_path_buf()));
    }
    AliasTable::from_json_path(path)
}

fn report_unmapped(session: &Session) {
    for label in session.unmapped_regions() {
        eprintln!("warning: region '{label}' has no alias entry and was kept as written");
    }
}

fn print_text(view: &DashboardView) {
    if view.is_empty() {
        println!("No data for the selected filters. Try expanding your selections.");
        return;
    }

    let kpis = &view.kpis;
    println!("Total units: {}", format_units(kpis.total_units));
    match (kpis.latest_year, kpis.latest_year_units) {
        (Some(year), Some(units)) => {
            let delta = kpis
                .latest_year_delta
                .map(|delta| format!(" ({delta:+})"))
                .unwrap_or_default();
            println!("Units {year}: {}{delta}", format_units(units));
        }
        _ => println!("Units (latest year): -"),
    }
    match &kpis.top_region {
        Some(top) => println!("Top region: {} ({})", top.region, format_units(top.units)),
        None => println!("Top region: -"),
    }
    match kpis.tractor_share {
        Some(share) => println!("Tractor share: {share:.1}%"),
        None => println!("Tractor share: -"),
    }

    let pivot = &view.aggregates.pivot;
    println!();
    let header: Vec<String> = pivot.years.iter().map(i32::to_string).collect();
    println!("{:<20} {}", "", header.join("\t"));
    for row in &pivot.rows {
        let cells: Vec<String> = pivot
            .years
            .iter()
            .map(|year| match row.cells.get(year) {
                Some(CellValue::Units(units)) => format_units(*units),
                _ => "-".to_string(),
            })
            .collect();
        println!("{:<20} {}", row.key, cells.join("\t"));
    }
}

fn format_units(units: f64) -> String {
    if units.fract() == 0.0 {
        format!("{units:.0}")
    } else {
        format!("{units:.2}")
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Summarise and export PLE tractor and mower unit sales."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print KPIs and the pivot table for a selection.
    Summary(SummaryArgs),
    /// Write a selection to CSV, Excel, or JSON.
    Export(ExportArgs),
}

#[derive(clap::Args)]
struct SelectionArgs {
    /// Sales workbook. Defaults to the bundled data file.
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON object mapping raw region labels to canonical names.
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// Products to include; repeat for several. Defaults to all.
    #[arg(long = "product", value_enum)]
    products: Vec<ProductArg>,

    /// Regions to include; repeat for several. Defaults to all.
    #[arg(long = "region")]
    regions: Vec<String>,

    /// First year to include.
    #[arg(long)]
    from: Option<i32>,

    /// Last year to include.
    #[arg(long)]
    to: Option<i32>,

    /// Keep the 'World' aggregate region.
    #[arg(long)]
    include_world: bool,

    /// Dimension used for pivot rows.
    #[arg(long, value_enum, default_value_t = PivotAxisArg::Product)]
    pivot_by: PivotAxisArg,

    /// Ordering of pivot rows.
    #[arg(long, value_enum, default_value_t = RowOrderArg::FirstSeen)]
    order: RowOrderArg,
}

#[derive(clap::Args)]
struct SummaryArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(clap::Args)]
struct ExportArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Output file path.
    #[arg(long)]
    output: PathBuf,

    /// What to export. Guessed from the output extension when omitted.
    #[arg(long, value_enum)]
    kind: Option<ExportKindArg>,
}

impl SelectionArgs {
    fn filter_spec(&self, aliases: &AliasTable) -> FilterSpec {
        FilterSpec {
            products: self.products.iter().copied().map(Product::from).collect(),
            regions: self
                .regions
                .iter()
                .map(|region| aliases.normalize(region))
                .collect(),
            year_range: YearRange::new(
                self.from.unwrap_or(i32::MIN),
                self.to.unwrap_or(i32::MAX),
            ),
            include_world_aggregate: self.include_world,
        }
    }

    fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            pivot_axis: self.pivot_by.into(),
            row_order: self.order.into(),
        }
    }

    fn view(&self, session: &Session) -> DashboardView {
        let spec = self.filter_spec(session.aliases());
        session.view(&spec, &self.aggregate_options())
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ProductArg {
    Tractor,
    Mower,
}

impl From<ProductArg> for Product {
    fn from(arg: ProductArg) -> Self {
        match arg {
            ProductArg::Tractor => Product::Tractor,
            ProductArg::Mower => Product::Mower,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PivotAxisArg {
    Product,
    Region,
}

impl From<PivotAxisArg> for PivotAxis {
    fn from(arg: PivotAxisArg) -> Self {
        match arg {
            PivotAxisArg::Product => PivotAxis::Product,
            PivotAxisArg::Region => PivotAxis::Region,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RowOrderArg {
    FirstSeen,
    Name,
    Total,
}

impl From<RowOrderArg> for RowOrder {
    fn from(arg: RowOrderArg) -> Self {
        match arg {
            RowOrderArg::FirstSeen => RowOrder::FirstSeen,
            RowOrderArg::Name => RowOrder::Name,
            RowOrderArg::Total => RowOrder::TotalDescending,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExportKindArg {
    Pivot,
    Records,
    Report,
    Json,
}

impl From<ExportKindArg> for ExportKind {
    fn from(kind: ExportKindArg) -> Self {
        match kind {
            ExportKindArg::Pivot => ExportKind::Pivot,
            ExportKindArg::Records => ExportKind::Records,
            ExportKindArg::Report => ExportKind::Report,
            ExportKindArg::Json => ExportKind::Json,
        }
    }
}
