//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::DashboardError;

#[derive(Parser, Debug)]
#[command(
    name = "tradewarehouse",
    about = "Analytics dashboard over a PostgreSQL trade warehouse"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the dashboard web server
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run a read-only SELECT and print the result as CSV
    Query {
        #[arg(long)]
        sql: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Export a warehouse base table as CSV
    Export {
        #[arg(long)]
        table: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Verify the warehouse is reachable
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(config.as_deref()),
        Command::Query { sql, config } => run_query(&sql, config.as_deref()),
        Command::Export {
            table,
            output,
            config,
        } => run_export(&table, output.as_deref(), config.as_deref()),
        Command::Check { config } => run_check(config.as_deref()),
    }
}

fn fail(err: &DashboardError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// The INI file when given, otherwise an empty config so that
/// `DATABASE_URL` alone is enough.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn env_database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

#[cfg(feature = "postgres")]
fn connect(
    config_path: Option<&Path>,
) -> Result<crate::adapters::postgres_adapter::PostgresWarehouse, ExitCode> {
    use crate::adapters::postgres_adapter::PostgresWarehouse;
    use crate::domain::settings::DatabaseSettings;

    let config = load_config(config_path)?;
    let settings =
        DatabaseSettings::resolve(&config, env_database_url()).map_err(|e| fail(&e))?;
    PostgresWarehouse::connect(&settings).map_err(|e| fail(&e))
}

fn run_query(sql_text: &str, config_path: Option<&Path>) -> ExitCode {
    #[cfg(feature = "postgres")]
    {
        use crate::adapters::csv_export::write_csv;
        use crate::domain::dashboards::explorer::run_select;

        let warehouse = match connect(config_path) {
            Ok(w) => w,
            Err(code) => return code,
        };
        let result = run_select(&warehouse, sql_text).and_then(|table| {
            eprintln!("{} rows", table.len());
            write_csv(&table, std::io::stdout().lock())
        });
        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "postgres"))]
    {
        let _ = (sql_text, config_path);
        eprintln!("error: postgres feature is required for query");
        ExitCode::from(1)
    }
}

fn run_export(table: &str, output: Option<&Path>, config_path: Option<&Path>) -> ExitCode {
    #[cfg(feature = "postgres")]
    {
        use crate::adapters::csv_export::write_csv;
        use crate::domain::dashboards::warehouse::export_table;
        use std::fs::File;
        use std::io::BufWriter;

        let warehouse = match connect(config_path) {
            Ok(w) => w,
            Err(code) => return code,
        };
        let result = export_table(&warehouse, table).and_then(|rows| match output {
            Some(path) => {
                let file = File::create(path)?;
                write_csv(&rows, BufWriter::new(file))?;
                eprintln!("Wrote {} rows to {}", rows.len(), path.display());
                Ok(())
            }
            None => write_csv(&rows, std::io::stdout().lock()),
        });
        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "postgres"))]
    {
        let _ = (table, output, config_path);
        eprintln!("error: postgres feature is required for export");
        ExitCode::from(1)
    }
}

fn run_check(config_path: Option<&Path>) -> ExitCode {
    #[cfg(feature = "postgres")]
    {
        use crate::domain::dashboards::warehouse::base_tables;
        use crate::domain::query::QueryParams;
        use crate::domain::sql;
        use crate::ports::warehouse_port::WarehousePort;

        let warehouse = match connect(config_path) {
            Ok(w) => w,
            Err(code) => return code,
        };
        if let Err(e) = warehouse.query(sql::HEALTH_CHECK, &QueryParams::new()) {
            return fail(&e);
        }
        match base_tables(&warehouse) {
            Ok(tables) => {
                eprintln!("ok: warehouse reachable, {} base tables", tables.len());
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "postgres"))]
    {
        let _ = config_path;
        eprintln!("error: postgres feature is required for check");
        ExitCode::from(1)
    }
}

fn run_serve(config_path: Option<&Path>) -> ExitCode {
    #[cfg(all(feature = "web", feature = "postgres"))]
    {
        use crate::adapters::postgres_adapter::PostgresWarehouse;
        use crate::adapters::query_cache::CachedWarehouse;
        use crate::adapters::web::{serve, AppState};
        use crate::domain::settings::AppSettings;
        use crate::ports::warehouse_port::WarehousePort;
        use std::sync::Arc;

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };
        let settings = match AppSettings::resolve(&config, env_database_url()) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
        let warehouse = match PostgresWarehouse::connect(&settings.database) {
            Ok(w) => w,
            Err(e) => return fail(&e),
        };
        let cached = CachedWarehouse::new(warehouse, settings.cache_ttl);
        tracing::info!(ttl_secs = cached.ttl().as_secs(), "query cache enabled");
        let warehouse: Arc<dyn WarehousePort + Send + Sync> = Arc::new(cached);

        let state = AppState {
            warehouse,
            static_dir: settings.static_dir.clone(),
        };

        eprintln!("Starting web server on http://{}", settings.listen);
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => return fail(&DashboardError::Io(e)),
        };
        match runtime.block_on(serve(state, settings.listen)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(all(feature = "web", feature = "postgres")))]
    {
        let _ = config_path;
        eprintln!("error: web and postgres features are required for serve");
        ExitCode::from(1)
    }
}
