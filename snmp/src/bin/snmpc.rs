/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use clap::{Parser, Subcommand};

use snmp_client::{
    BulkConfig, Client, Config, ErrorHandling, NativeValue, Oid, Result,
};

#[derive(Parser)]
#[clap(version, author)]
struct Args {
    /// Agent host name or address.
    host: String,
    /// Community string.
    #[clap(long, short = 'c', default_value = "public")]
    community: String,
    /// Agent UDP port.
    #[clap(long, short = 'p', default_value_t = 161)]
    port: u16,
    /// Request timeout in seconds.
    #[clap(long, short = 't', default_value_t = 2.0)]
    timeout: f64,
    /// Keep walking the other subtrees when an agent returns
    /// non-increasing OIDs.
    #[clap(long)]
    lenient: bool,
    /// Increase logging verbosity.
    #[clap(long = "verbose", short = 'v', parse(from_occurrences))]
    verbose: u8,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read a single variable.
    Get { oid: String },
    /// Read the variable following an OID.
    Getnext { oid: String },
    /// Traverse one or more subtrees using getnext requests.
    Walk { oids: Vec<String> },
    /// Traverse one or more subtrees using bulk requests.
    Bulkwalk {
        /// Varbinds to request per OID and round.
        #[clap(long, default_value_t = 10)]
        bulk_size: u32,
        oids: Vec<String>,
    },
    /// Walk a table and print its rows as JSON.
    Table {
        /// Length of the OID prefix shared by all columns.
        #[clap(long, default_value_t = 0)]
        num_base_nodes: usize,
        oid: String,
    },
}

impl Args {
    fn verbosity(&self) -> simplelog::LevelFilter {
        match self.verbose {
            0 => simplelog::LevelFilter::Warn,
            1 => simplelog::LevelFilter::Info,
            2 => simplelog::LevelFilter::Debug,
            3.. => simplelog::LevelFilter::Trace,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    if let Err(e) = simplelog::TermLogger::init(
        args.verbosity(),
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config {
        port: args.port,
        timeout: args.timeout,
        errors: match args.lenient {
            true => ErrorHandling::Warn,
            false => ErrorHandling::Strict,
        },
        bulk: BulkConfig {
            bulk_size: match &args.command {
                Command::Bulkwalk { bulk_size, .. } => *bulk_size,
                _ => BulkConfig::default().bulk_size,
            },
            ..BulkConfig::default()
        },
    };

    let client = Client::new(&args.host, args.community.as_bytes())
        .set_config(config);

    match &args.command {
        Command::Get { oid } => {
            let oid: Oid = oid.parse()?;
            println!("{} = {}", oid, client.get(&oid).await?);
        }
        Command::Getnext { oid } => {
            let bind = client.getnext(&oid.parse()?).await?;
            println!("{} = {}", bind.oid, bind.value);
        }
        Command::Walk { oids } => {
            let oids = parse_oids(oids)?;
            let mut walk = client.multiwalk(&oids);
            while let Some(bind) = walk.next().await {
                let bind = bind?;
                println!("{} = {}", bind.oid, bind.value);
            }
        }
        Command::Bulkwalk { oids, .. } => {
            let oids = parse_oids(oids)?;
            let mut walk = client.bulkwalk(&oids);
            while let Some(bind) = walk.next().await {
                let bind = bind?;
                println!("{} = {}", bind.oid, bind.value);
            }
        }
        Command::Table {
            oid,
            num_base_nodes,
        } => {
            let rows = client
                .native()
                .table(&oid.parse()?, *num_base_nodes)
                .await?;
            for row in rows {
                let row = row
                    .into_iter()
                    .map(|(col, value)| (col, to_json(value)))
                    .collect::<serde_json::Map<_, _>>();
                println!("{}", serde_json::Value::Object(row));
            }
        }
    }

    Ok(())
}

fn parse_oids(oids: &[String]) -> Result<Vec<Oid>> {
    oids.iter().map(|oid| oid.parse()).collect()
}

fn to_json(value: NativeValue) -> serde_json::Value {
    match value {
        NativeValue::Null => serde_json::Value::Null,
        NativeValue::Int(n) => n.into(),
        NativeValue::Uint(n) => n.into(),
        NativeValue::Bytes(bytes) => {
            String::from_utf8_lossy(&bytes).into_owned().into()
        }
        NativeValue::Text(s) => s.into(),
    }
}
