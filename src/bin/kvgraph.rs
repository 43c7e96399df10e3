use std::{env, process};

use kvgraph::{
    KvGraphError,
    client::{CommandLineConfig, InspectorClient},
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", CommandLineConfig::help());
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let config = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    let client = match InspectorClient::open(&config) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{err}");
            process::exit(2);
        }
    };

    if let Err(err) = run_command(&client, &config.command) {
        eprintln!("command failed: {err}");
        process::exit(1);
    }
}

fn run_command(client: &InspectorClient, command: &str) -> Result<(), KvGraphError> {
    match command {
        "status" => {
            let (order, size) = client.status()?;
            let location = client
                .backend()
                .location()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "memory".to_string());
            println!("db={location} order={order} size={size}");
        }
        "vertices" => {
            for hash in client.vertices()? {
                println!("{hash}");
            }
        }
        "edges" => {
            for (hash, edge) in client.edges()? {
                println!("{hash} {} -> {}", edge.source, edge.target);
            }
        }
        "schemas" => {
            for schema in client.schemas()? {
                let json = serde_json::to_string(&schema)
                    .map_err(|e| KvGraphError::encoding(e.to_string()))?;
                println!("{json}");
            }
        }
        "check" => {
            let report = client.check()?;
            let json = serde_json::to_string(&report)
                .map_err(|e| KvGraphError::encoding(e.to_string()))?;
            println!("{json}");
            if report.has_issues() {
                process::exit(1);
            }
        }
        other => {
            return Err(KvGraphError::invalid_input(format!(
                "unknown command {other}"
            )));
        }
    }
    Ok(())
}
