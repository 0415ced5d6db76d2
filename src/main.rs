// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use expense_tracker::policy::config::{
    block_mode, category_limit, clear_category_limit, mark_category_unwanted, monthly_budget,
    set_block_mode, set_category_limit, set_monthly_budget, PolicyConfig,
};
use expense_tracker::{
    budget_status, category_breakdown, export_expenses, monthly_trend, AppConfig, Category,
    Confirm, ExpenseFilter, ExportFormat, Money, NewExpense, PolicyEngine, Proceed, Prompt,
    RecordStore, SqliteStore, Submission, YearMonth, DATE_FORMAT,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "expense-tracker", version)]
#[command(about = "Personal expense tracker with budget and category-limit guardrails")]
struct Cli {
    /// Config file (TOML). Defaults to ./expense-tracker.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path, overrides the config file
    #[arg(long, env = "EXPENSE_TRACKER_DB", global = true)]
    db: Option<String>,

    /// Answer every confirmation so the expense goes ahead
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record an expense (runs the limit / block / budget checks first)
    Add(AddArgs),
    /// Delete an expense by id
    Delete { id: i64 },
    /// List expenses
    List(ListArgs),
    /// Show or set the monthly budget (0 clears it)
    Budget { amount: Option<Money> },
    /// Show, set or clear a category limit
    Limit(LimitArgs),
    /// Mark a category as unwanted, or list unwanted categories
    Unwanted(UnwantedArgs),
    /// Show or switch block mode
    BlockMode { state: Option<Switch> },
    /// Month-to-date total
    Total(TotalArgs),
    /// Month-end projection
    Project(MonthArgs),
    /// Spending suggestions
    Suggest(MonthArgs),
    /// Budget vs. spend
    Status(MonthArgs),
    /// Category breakdown and monthly trend
    Report(MonthArgs),
    /// Export expenses to CSV or JSON
    Export(ExportArgs),
    /// Interactive dashboard (default)
    Ui(MonthArgs),
}

#[derive(Args, Debug, Default)]
struct MonthArgs {
    /// Month as YYYY-MM, defaults to the current month
    #[arg(long, value_name = "YYYY-MM")]
    month: Option<YearMonth>,
}

#[derive(Args, Debug)]
struct AddArgs {
    amount: Money,
    category: Category,
    #[arg(short, long)]
    description: Option<String>,
    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    month: MonthArgs,
    /// Every month instead of one
    #[arg(long, conflicts_with = "month")]
    all: bool,
    #[arg(long)]
    category: Option<Category>,
}

#[derive(Args, Debug)]
struct LimitArgs {
    category: Category,
    amount: Option<Money>,
    #[arg(long, conflicts_with = "amount")]
    clear: bool,
}

#[derive(Args, Debug)]
struct UnwantedArgs {
    category: Option<Category>,
    /// Remove the unwanted mark instead
    #[arg(long, requires = "category")]
    off: bool,
}

#[derive(Args, Debug)]
struct TotalArgs {
    #[command(flatten)]
    month: MonthArgs,
    #[arg(long)]
    category: Option<Category>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    path: PathBuf,
    #[command(flatten)]
    month: MonthArgs,
    #[arg(long, conflicts_with = "month")]
    all: bool,
    #[arg(long)]
    category: Option<Category>,
    /// Guessed from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Switch {
    On,
    Off,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

/// Asks each prompt on stdout and reads y/n from stdin. Anything but y/yes is "no".
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        println!("\n⚠️  {}", prompt.title());
        print!("{} [y/N] ", prompt.question());
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(err) => {
                tracing::warn!("could not read answer: {err}");
                false
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let store = SqliteStore::open(&config.database.path)
        .with_context(|| format!("failed to open database {}", config.database.path))?;
    let engine = PolicyEngine::new(&store).with_currency_symbol(config.currency_symbol.clone());

    let mut confirm: Box<dyn Confirm> = if cli.yes { Box::new(Proceed) } else { Box::new(StdinConfirm) };

    match cli.command.unwrap_or(Command::Ui(MonthArgs::default())) {
        Command::Add(args) => run_add(&engine, args, confirm.as_mut()),
        Command::Delete { id } => run_delete(&store, id),
        Command::List(args) => run_list(&engine, &config, args),
        Command::Budget { amount } => run_budget(&store, &config, amount),
        Command::Limit(args) => run_limit(&store, &config, args),
        Command::Unwanted(args) => run_unwanted(&store, args),
        Command::BlockMode { state } => run_block_mode(&store, state),
        Command::Total(args) => run_total(&engine, &config, args),
        Command::Project(args) => run_project(&engine, &config, args),
        Command::Suggest(args) => run_suggest(&engine, args),
        Command::Status(args) => run_status(&engine, &config, args),
        Command::Report(args) => run_report(&engine, &config, args),
        Command::Export(args) => run_export(&engine, args),
        Command::Ui(args) => run_ui_mode(&engine, &config, args),
    }
}

fn month_or_current<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, args: &MonthArgs) -> YearMonth {
    args.month.unwrap_or_else(|| engine.current_month())
}

fn money(config: &AppConfig, amount: Money) -> String {
    format!("{}{}", config.currency_symbol, amount)
}

// ============================================================================
// EXPENSES
// ============================================================================

fn run_add<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, args: AddArgs, confirm: &mut dyn Confirm) -> Result<()> {
    let date = args
        .date
        .unwrap_or_else(|| Local::now().date_naive().format(DATE_FORMAT).to_string());
    let expense = NewExpense::new(args.amount, args.category, args.description.as_deref(), &date)?;

    match engine.submit_expense(&expense, confirm)? {
        Submission::Committed { id, overrides } => {
            for prompt in &overrides {
                println!("⚠️  Added past {} (over by {})", prompt.title().to_lowercase(), prompt.overshoot());
            }
            println!("✅ Expense #{} added: {} {} on {}", id, expense.amount, expense.category, date);
        }
        Submission::Rejected(reason) => {
            println!("❌ Expense not added: {}", reason);
        }
    }
    Ok(())
}

fn run_delete(store: &SqliteStore, id: i64) -> Result<()> {
    if store.delete_expense(id)? {
        println!("🗑️  Expense #{} deleted", id);
    } else {
        bail!("no expense with id {}", id);
    }
    Ok(())
}

fn run_list<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, config: &AppConfig, args: ListArgs) -> Result<()> {
    let mut filter = if args.all {
        ExpenseFilter::all()
    } else {
        ExpenseFilter::month(month_or_current(engine, &args.month))
    };
    if let Some(category) = args.category {
        filter = filter.with_category(category);
    }

    let expenses = engine.store().query_expenses(&filter)?;
    if expenses.is_empty() {
        println!("No expenses found");
        return Ok(());
    }

    println!("{:>5}  {:<10}  {:<14}  {:>12}  Description", "ID", "Date", "Category", "Amount");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for expense in &expenses {
        println!(
            "{:>5}  {:<10}  {:<14}  {:>12}  {}",
            expense.id,
            expense.date_string(),
            expense.category.name(),
            money(config, expense.amount),
            expense.description.as_deref().unwrap_or("")
        );
    }
    let total: Money = expenses.iter().map(|e| e.amount).sum();
    println!("\n{} expenses, total {}", expenses.len(), money(config, total));
    Ok(())
}

// ============================================================================
// SETTINGS
// ============================================================================

fn run_budget(store: &SqliteStore, config: &AppConfig, amount: Option<Money>) -> Result<()> {
    if let Some(amount) = amount {
        set_monthly_budget(store, amount)?;
    }
    match monthly_budget(store)? {
        Some(budget) => println!("💰 Monthly budget: {}", money(config, budget)),
        None => println!("💰 No monthly budget set"),
    }
    Ok(())
}

fn run_limit(store: &SqliteStore, config: &AppConfig, args: LimitArgs) -> Result<()> {
    if args.clear {
        clear_category_limit(store, &args.category)?;
    } else if let Some(amount) = args.amount {
        set_category_limit(store, &args.category, amount)?;
    }
    match category_limit(store, &args.category)? {
        Some(limit) => println!("📏 Limit for {}: {}", args.category, money(config, limit)),
        None => println!("📏 No limit for {}", args.category),
    }
    Ok(())
}

fn run_unwanted(store: &SqliteStore, args: UnwantedArgs) -> Result<()> {
    if let Some(category) = &args.category {
        mark_category_unwanted(store, category, !args.off)?;
        if args.off {
            println!("✓ {} is no longer unwanted", category);
        } else {
            println!("🚫 {} marked as unwanted", category);
        }
        return Ok(());
    }

    let policy = PolicyConfig::load(store)?;
    if policy.unwanted_categories.is_empty() {
        println!("No unwanted categories");
    } else {
        for category in &policy.unwanted_categories {
            println!("🚫 {}", category);
        }
    }
    Ok(())
}

fn run_block_mode(store: &SqliteStore, state: Option<Switch>) -> Result<()> {
    if let Some(state) = state {
        set_block_mode(store, matches!(state, Switch::On))?;
    }
    let on = block_mode(store)?;
    println!("🔒 Block mode: {}", if on { "ON" } else { "OFF" });
    Ok(())
}

// ============================================================================
// REPORTS
// ============================================================================

fn run_total<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, config: &AppConfig, args: TotalArgs) -> Result<()> {
    let month = month_or_current(engine, &args.month);
    match &args.category {
        Some(category) => {
            let total = engine.month_category_total(month.year(), month.month(), category)?;
            println!("{} {}: {}", month, category, money(config, total));
        }
        None => {
            let total = engine.month_total(month.year(), month.month())?;
            println!("{} total: {}", month, money(config, total));
        }
    }
    Ok(())
}

fn run_project<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, config: &AppConfig, args: MonthArgs) -> Result<()> {
    let month = month_or_current(engine, &args);
    let projected = engine.projection(month.year(), month.month())?;
    println!("📈 Projected spend for {}: {}", month, money(config, projected));
    if let Some(budget) = engine.config()?.monthly_budget {
        println!("   Budget: {}", money(config, budget));
    }
    Ok(())
}

fn run_suggest<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, args: MonthArgs) -> Result<()> {
    let month = month_or_current(engine, &args);
    println!("💡 Suggestions for {}", month);
    for line in engine.suggestions(month.year(), month.month())? {
        println!("  • {}", line);
    }
    Ok(())
}

fn run_status<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, config: &AppConfig, args: MonthArgs) -> Result<()> {
    let month = month_or_current(engine, &args);
    let status = budget_status(engine.store(), month)?;

    println!("📊 {}", month);
    if status.has_budget() {
        println!(
            "Budget: {} | Spent: {} | Savings: {} ({:.0}% used)",
            money(config, status.budget),
            money(config, status.spent),
            money(config, status.savings),
            status.percent_used
        );
    } else {
        println!("No budget set | Spent: {}", money(config, status.spent));
    }
    Ok(())
}

fn run_report<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, config: &AppConfig, args: MonthArgs) -> Result<()> {
    let month = month_or_current(engine, &args);

    println!("🥧 Spending by category, {}", month);
    let shares = category_breakdown(engine.store(), month)?;
    if shares.is_empty() {
        println!("  (no expenses)");
    }
    for share in &shares {
        println!("  {:<14} {:>12}  {:>5.1}%", share.category.name(), money(config, share.total), share.percent);
    }

    println!("\n📉 Monthly trend");
    for (month, total) in monthly_trend(engine.store(), config.trend_months)? {
        println!("  {}  {:>12}", month, money(config, total));
    }
    Ok(())
}

fn run_export<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, args: ExportArgs) -> Result<()> {
    let mut filter = if args.all {
        ExpenseFilter::all()
    } else {
        ExpenseFilter::month(month_or_current(engine, &args.month))
    };
    if let Some(category) = args.category {
        filter = filter.with_category(category);
    }

    let expenses = engine.store().query_expenses(&filter)?;
    let format = args
        .format
        .map(ExportFormat::from)
        .unwrap_or_else(|| ExportFormat::from_path(&args.path));

    let rows = export_expenses(&expenses, &args.path, format)
        .with_context(|| format!("failed to export to {}", args.path.display()))?;
    println!("📤 Exported {} expenses to {}", rows, args.path.display());
    Ok(())
}

// ============================================================================
// DASHBOARD
// ============================================================================

#[cfg(feature = "tui")]
fn run_ui_mode<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, config: &AppConfig, args: MonthArgs) -> Result<()> {
    let month = month_or_current(engine, &args);
    let mut app = ui::App::load(engine, month, &config.currency_symbol)?;
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode<S: RecordStore + ?Sized>(_engine: &PolicyEngine<'_, S>, _config: &AppConfig, _args: MonthArgs) -> Result<()> {
    bail!("TUI mode not available, rebuild with --features tui")
}
