use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Encode JSON rows (one array per line) into COPY text
    Encode {
        #[arg(long, help = "JSON lines file, '-' for stdin")]
        input: String,

        #[arg(
            long,
            value_delimiter = ',',
            help = "Postgres column types, e.g. int4,text,jsonb,_int4"
        )]
        types: Option<Vec<String>>,

        #[arg(
            long,
            help = "If specified, writes the COPY payload to this file instead of stdout"
        )]
        output: Option<String>,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// Stream a COPY text file into a table
    Load {
        /// Connection string; falls back to COPYFY_PG_URL
        #[arg(long)]
        conn_str: Option<String>,

        #[arg(long, help = "Target table, optionally schema-qualified")]
        table: String,

        #[arg(long, value_delimiter = ',', help = "Target columns in row order")]
        columns: Vec<String>,

        #[arg(long, help = "COPY text file, '-' for stdin")]
        input: String,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// Read a table back through COPY and print each row as JSON
    Dump {
        /// Connection string; falls back to COPYFY_PG_URL
        #[arg(long)]
        conn_str: Option<String>,

        #[arg(long)]
        table: String,

        #[arg(long, value_delimiter = ',', help = "Columns to read, all when omitted")]
        columns: Vec<String>,

        #[command(flatten)]
        format: FormatArgs,
    },
    /// Test a Postgres connection string
    TestConn {
        /// Connection string; falls back to COPYFY_PG_URL
        #[arg(long)]
        conn_str: Option<String>,
    },
}

/// Delimiter and null sentinel shared by every COPY-related subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FormatArgs {
    #[arg(long, help = "Field delimiter (default: tab)")]
    pub delimiter: Option<char>,

    #[arg(long, help = "Null sentinel (default: \\N)")]
    pub null: Option<String>,
}
