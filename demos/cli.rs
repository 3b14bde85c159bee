use std::env;

use chrono::NaiveDate;
use elexon_bmrs::{Client, ClientOptions, Params};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage:\n  cargo run --example cli -- <service-code> <settlement-date> [key-file]\n\nExample (actual generation per type for one day):\n  cargo run --example cli -- B1630 2024-03-01 api_key.txt\n\nNotes:\n- Requires a BMRS API key (free registration with Elexon).\n- Key-only services (e.g. SYSMSG) still need a date argument; it is ignored for them."
        );
        std::process::exit(2);
    }

    let service_code = args[1].as_str();
    let date = match NaiveDate::parse_from_str(&args[2], "%Y-%m-%d") {
        Ok(d) => d,
        Err(e) => {
            eprintln!("bad settlement date {:?}: {e}", args[2]);
            std::process::exit(2);
        }
    };

    let key_file = args.get(3).map(|p| std::path::Path::new(p));
    let client = match Client::from_key_file(key_file, ClientOptions::default()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("cannot create client: {e}");
            std::process::exit(1);
        }
    };

    let params = Params::new().with("SettlementDate", date);
    match client.query_records(service_code, params) {
        Ok(records) => {
            println!("{} records", records.len());
            if let Some(first) = records.first() {
                println!("first record:");
                for (field, value) in first {
                    println!("  {field}: {value}");
                }
            }
        }
        Err(e) => {
            eprintln!("query failed: {e}");
            std::process::exit(1);
        }
    }
}
