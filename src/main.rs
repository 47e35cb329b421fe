use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use go_syntax_kit::config::{apply_plan, load_from_path, JobResult};
use go_syntax_kit::go::search::{self, suggest_similar};
use go_syntax_kit::go::{GoLocator, GoParser, GoSyntaxError, GoTarget, ParsedSource};
use go_syntax_kit::imports::{
    inject_imports, inject_named_imports, remove_imports, remove_named_imports,
};
use go_syntax_kit::norm::FunctionSignature;
use go_syntax_kit::tag::{
    extract_field, extract_keyed_value, set_tag_field_value, FieldMode, InsertLocation,
};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const LOG_ENV: &str = "GO_SYNTAX_KIT_LOG";

#[derive(Parser)]
#[command(name = "go-syntax-kit")]
#[command(about = "Go source analysis and byte-exact rewriting", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level unless GO_SYNTAX_KIT_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add missing imports to a Go file, or remove imports from it
    Imports {
        file: PathBuf,

        /// Import path to ensure, as PATH or ALIAS=PATH (repeatable)
        #[arg(short = 'p', long = "package", required_unless_present = "remove")]
        packages: Vec<String>,

        /// Import to remove, as PATH or ALIAS=PATH (repeatable)
        #[arg(short, long)]
        remove: Vec<String>,

        /// Write the result back instead of printing it
        #[arg(short, long)]
        write: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Read or rewrite struct tags
    #[command(subcommand)]
    Tag(TagCommand),

    /// Print the declaration matching a target
    Find {
        file: PathBuf,

        #[command(flatten)]
        target: FindTarget,
    },

    /// Print the normalized signature of a function or method
    Signature {
        file: PathBuf,
        function: String,

        /// Receiver type name, for methods
        #[arg(short, long)]
        receiver: Option<String>,

        /// Qualify local exported types with this package name
        #[arg(short, long)]
        package: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// List package and declarations of every .go file under a directory
    Scan { dir: PathBuf },

    /// Apply a rewrite plan to a workspace
    Apply {
        plan: PathBuf,

        /// Path to workspace root (defaults to the current directory)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },
}

#[derive(Subcommand)]
enum TagCommand {
    /// Print the value of a key, or of a field inside it
    Get {
        tag: String,
        key: String,

        #[arg(short, long)]
        field: Option<String>,

        /// Keep whitespace between the separator and the field value
        #[arg(long)]
        keep_whitespace: bool,
    },

    /// Set `field:value` inside the value of a key
    Set {
        tag: String,
        key: String,
        field: String,
        value: String,

        #[arg(long, default_value = "end")]
        position: InsertLocation,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct FindTarget {
    #[arg(long)]
    function: Option<String>,

    /// Method as Receiver.Name (a leading `*` is ignored)
    #[arg(long)]
    method: Option<String>,

    #[arg(long = "struct")]
    struct_name: Option<String>,

    #[arg(long)]
    interface: Option<String>,

    #[arg(long = "type")]
    type_name: Option<String>,
}

impl FindTarget {
    fn into_target(self) -> Result<GoTarget> {
        if let Some(name) = self.function {
            return Ok(GoTarget::Function { name });
        }
        if let Some(path) = self.method {
            return GoTarget::method_from_path(&path)
                .with_context(|| format!("expected Receiver.Name, got '{path}'"));
        }
        if let Some(name) = self.struct_name {
            return Ok(GoTarget::Struct { name });
        }
        if let Some(name) = self.interface {
            return Ok(GoTarget::Interface { name });
        }
        match self.type_name {
            Some(name) => Ok(GoTarget::Type { name }),
            None => anyhow::bail!("no target given"),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Imports {
            file,
            packages,
            remove,
            write,
            diff,
        } => cmd_imports(&file, &packages, &remove, write, diff),

        Commands::Tag(TagCommand::Get {
            tag,
            key,
            field,
            keep_whitespace,
        }) => cmd_tag_get(&tag, &key, field.as_deref(), keep_whitespace),

        Commands::Tag(TagCommand::Set {
            tag,
            key,
            field,
            value,
            position,
        }) => {
            println!("{}", set_tag_field_value(&tag, &key, &field, &value, position)?);
            Ok(())
        }

        Commands::Find { file, target } => cmd_find(&file, target.into_target()?),

        Commands::Signature {
            file,
            function,
            receiver,
            package,
            json,
        } => cmd_signature(&file, &function, receiver.as_deref(), package.as_deref(), json),

        Commands::Scan { dir } => cmd_scan(&dir),

        Commands::Apply {
            plan,
            workspace,
            dry_run,
            diff,
        } => cmd_apply(&plan, workspace, dry_run, diff),
    }
}

fn read_source(file: &Path) -> Result<Vec<u8>> {
    fs::read(file).with_context(|| format!("failed to read {}", file.display()))
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (rewritten)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => format!(" {change}").normal(),
        };
        print!("{line}");
    }
}

/// Split `ALIAS=PATH` entries from plain paths.
fn import_entries(entries: &[String]) -> (Vec<&str>, Vec<(&str, &str)>) {
    let mut plain = Vec::new();
    let mut named = Vec::new();
    for entry in entries {
        match entry.split_once('=') {
            Some(pair) => named.push(pair),
            None => plain.push(entry.as_str()),
        }
    }
    (plain, named)
}

fn cmd_imports(
    file: &Path,
    packages: &[String],
    remove: &[String],
    write: bool,
    show_diff: bool,
) -> Result<()> {
    let source = read_source(file)?;

    let mut rewritten = source.clone();
    let (plain, named) = import_entries(remove);
    if !plain.is_empty() {
        rewritten = remove_imports(&rewritten, &plain)
            .with_context(|| format!("failed to remove imports from {}", file.display()))?;
    }
    if !named.is_empty() {
        rewritten = remove_named_imports(&rewritten, &named)
            .with_context(|| format!("failed to remove imports from {}", file.display()))?;
    }

    let (plain, named) = import_entries(packages);
    if !plain.is_empty() {
        rewritten = inject_imports(&rewritten, &plain)
            .with_context(|| format!("failed to inject imports into {}", file.display()))?;
    }
    if !named.is_empty() {
        rewritten = inject_named_imports(&rewritten, &named)
            .with_context(|| format!("failed to inject imports into {}", file.display()))?;
    }

    if show_diff {
        if rewritten == source {
            println!("{}", "No import changes".dimmed());
        } else {
            display_diff(
                file,
                &String::from_utf8_lossy(&source),
                &String::from_utf8_lossy(&rewritten),
            );
        }
    }

    if write {
        if rewritten != source {
            fs::write(file, &rewritten)
                .with_context(|| format!("failed to write {}", file.display()))?;
            println!("{} {}", "✓".green(), file.display());
        }
    } else if !show_diff {
        print!("{}", String::from_utf8_lossy(&rewritten));
    }
    Ok(())
}

fn cmd_tag_get(tag: &str, key: &str, field: Option<&str>, keep_whitespace: bool) -> Result<()> {
    let Some(value) = extract_keyed_value(tag, key)? else {
        anyhow::bail!("key '{key}' not found in tag");
    };
    let value = match field {
        Some(field) => {
            let mode = if keep_whitespace {
                FieldMode::IncludeWhitespacePrefix
            } else {
                FieldMode::ExcludeWhitespacePrefix
            };
            extract_field(value, field, mode)?
                .with_context(|| format!("field '{field}' not found in {key}:\"{value}\""))?
        }
        None => value,
    };
    println!("{value}");
    Ok(())
}

/// Names a target could have meant, for not-found errors.
fn target_candidates<'t>(parsed: &'t ParsedSource<'_>, target: &GoTarget) -> Vec<&'t str> {
    match target {
        GoTarget::Function { .. } => search::functions(parsed).iter().map(|f| f.name()).collect(),
        GoTarget::Method { .. } => search::methods(parsed).iter().map(|m| m.name()).collect(),
        GoTarget::Struct { .. } => search::struct_types(parsed).into_keys().collect(),
        GoTarget::Interface { .. } => search::interface_types(parsed)
            .iter()
            .map(|t| t.name())
            .collect(),
        _ => search::types(parsed).iter().map(|t| t.name()).collect(),
    }
}

fn target_name(target: &GoTarget) -> &str {
    match target {
        GoTarget::Function { name }
        | GoTarget::Method { name, .. }
        | GoTarget::Struct { name }
        | GoTarget::Interface { name }
        | GoTarget::Type { name } => name,
        GoTarget::Import { path } => path,
        GoTarget::Custom { query } => query,
    }
}

fn cmd_find(file: &Path, target: GoTarget) -> Result<()> {
    let source = read_source(file)?;
    let mut locator = GoLocator::new()?;

    match locator.locate(&source, &target) {
        Ok(found) => {
            println!(
                "{}",
                format!("{}:{}..{}", file.display(), found.span.start, found.span.end).dimmed()
            );
            println!("{}", found.text);
            Ok(())
        }
        Err(GoSyntaxError::NoMatch) => {
            let parsed = locator.parser_mut().parse_with_source(&source)?;
            let name = target_name(&target);
            let suggestions = suggest_similar(name, target_candidates(&parsed, &target));
            if suggestions.is_empty() {
                anyhow::bail!("'{name}' not found in {}", file.display());
            }
            anyhow::bail!(
                "'{name}' not found in {}; did you mean: {}?",
                file.display(),
                suggestions.join(", ")
            )
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_signature(
    file: &Path,
    function: &str,
    receiver: Option<&str>,
    package: Option<&str>,
    json: bool,
) -> Result<()> {
    let source = read_source(file)?;
    let mut parser = GoParser::new()?;
    let parsed = parser.parse_checked(&source)?;

    let func = match receiver {
        Some(receiver) => search::method_by_receiver_and_name(&parsed, receiver, function),
        None => search::function_by_name(&parsed, function),
    };
    let Some(func) = func else {
        let candidates: Vec<&str> = match receiver {
            Some(receiver) => search::methods_by_receiver(&parsed, receiver, false)
                .iter()
                .map(|m| m.name())
                .collect(),
            None => search::functions(&parsed).iter().map(|f| f.name()).collect(),
        };
        let suggestions = suggest_similar(function, candidates);
        if suggestions.is_empty() {
            anyhow::bail!("function '{function}' not found in {}", file.display());
        }
        anyhow::bail!(
            "function '{function}' not found in {}; did you mean: {}?",
            file.display(),
            suggestions.join(", ")
        );
    };

    let signature = FunctionSignature::of(&func, &source, package);
    if json {
        println!("{}", serde_json::to_string_pretty(&signature)?);
        return Ok(());
    }

    println!("{}", func.signature().bold());
    if let Some(doc) = func.doc() {
        println!("{}", doc.dimmed());
    }
    println!("params:  {}", signature.params.names_with_kinds().merge_parts());
    println!("results: {}", signature.results.names_with_kinds().merge_parts());
    if !signature.generics.is_empty() {
        println!("generics: {}", signature.generics.join(", "));
    }
    println!("call:    {}", signature.call_expression(&signature.name));
    Ok(())
}

fn cmd_scan(dir: &Path) -> Result<()> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("go")
        {
            files.push(entry.into_path());
        }
    }

    let mut parser = GoParser::new()?;
    let mut broken = 0;
    for file in &files {
        let source = read_source(file)?;
        let parsed = parser.parse_with_source(&source)?;

        let package = search::package_name(&parsed).unwrap_or("?");
        println!(
            "{} {}",
            file.display().to_string().bold(),
            format!("(package {package})").dimmed()
        );
        if parsed.has_errors() {
            broken += 1;
            println!("  {}", "contains syntax errors".yellow());
        }
        for spec in search::imports(&parsed) {
            println!("  import {}", spec.path);
        }
        for item in search::types(&parsed) {
            let kind = if item.is_struct() {
                "struct"
            } else if item.is_interface() {
                "interface"
            } else {
                "type"
            };
            println!("  {} {}", kind.cyan(), item.name());
        }
        for value in search::values(&parsed) {
            let kind = if value.is_const() { "const" } else { "var" };
            println!("  {} {}", kind.cyan(), value.names().join(", "));
        }
        for func in search::functions(&parsed) {
            println!("  {} {}", "func".cyan(), func.name());
        }
        for method in search::methods(&parsed) {
            let receiver = method.receiver().map(|r| r.type_name).unwrap_or("?");
            println!("  {} ({receiver}).{}", "method".cyan(), method.name());
        }
    }

    println!();
    println!(
        "{} files scanned, {} with syntax errors",
        files.len(),
        format!("{broken}").yellow()
    );
    Ok(())
}

fn cmd_apply(plan: &Path, workspace: Option<PathBuf>, dry_run: bool, show_diff: bool) -> Result<()> {
    let workspace = match workspace {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let config = load_from_path(plan)?;

    println!("Workspace: {}", workspace.display());
    if !config.meta.name.is_empty() {
        println!("Plan: {}", config.meta.name);
    }
    if dry_run {
        println!("{}", "[DRY RUN - showing what would be applied]".cyan());
    }
    println!();

    let report = apply_plan(&config, &workspace, dry_run);

    let mut total_applied = 0;
    let mut total_already_applied = 0;
    let mut total_failed = 0;
    for (job, result) in &report.jobs {
        match result {
            JobResult::Applied { file } => {
                let verb = if dry_run { "Would apply to" } else { "Applied to" };
                println!("{} {}: {} {}", "✓".green(), job, verb, file.display());
                total_applied += 1;
            }
            JobResult::AlreadyApplied { file } => {
                println!("{} {}: Already applied to {}", "⊙".yellow(), job, file.display());
                total_already_applied += 1;
            }
            JobResult::Failed { file, reason } => {
                eprintln!("{} {}: Failed - {}", "✗".red(), job, reason);
                eprintln!("  File: {}", file.display());
                total_failed += 1;
            }
        }
    }

    if show_diff {
        for (file, change) in &report.changes {
            println!();
            display_diff(
                file,
                &String::from_utf8_lossy(&change.before),
                &String::from_utf8_lossy(&change.after),
            );
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{total_applied}").green());
    println!(
        "  {} already applied",
        format!("{total_already_applied}").yellow()
    );
    println!("  {} failed", format!("{total_failed}").red());

    if total_failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
