use std::env;
use std::process;

use domain::adapters::memory_store::InMemoryStore;
use domain::service::TodoListService;
use domain::CoreError;

fn usage() -> String {
    format!(
        "{}\n\nUsage:\n  domain add <text>...\n  domain list\n\nNotes:\n  - This demo CLI uses an in-memory store; data is not persisted across runs.\n  - Each argument to `add` becomes one item; the resulting list is printed\n    after the adds.\n  - `list` only shows items added in the same invocation, so on its own it\n    always prints the empty state.",
        domain::about()
    )
}

fn print_usage() {
    eprintln!("{}", usage());
}

fn print_list(svc: &TodoListService<InMemoryStore>) -> Result<(), String> {
    let items = svc.load_list().map_err(|e| format!("list failed: {}", e))?;
    if items.is_empty() {
        println!("No items found");
    }
    for (i, item) in items.iter().enumerate() {
        println!("{:>3}. {}", i + 1, item.text());
    }
    Ok(())
}

fn run() -> Result<(), String> {
    let mut args = env::args().skip(1); // skip program name

    let Some(cmd) = args.next() else {
        print_usage();
        return Ok(());
    };

    let svc = TodoListService::new(InMemoryStore::new());

    match cmd.as_str() {
        "add" => {
            let texts: Vec<String> = args.collect();
            if texts.is_empty() {
                return Err("missing <text> for add".into());
            }
            for text in texts {
                match svc.add_item(&text) {
                    Ok(ack) => println!("added: {}", ack.item.text()),
                    Err(CoreError::Validation(msg)) => {
                        return Err(format!("rejected {:?}: {}", text, msg))
                    }
                    Err(e) => return Err(format!("add failed: {}", e)),
                }
            }
            print_list(&svc)
        }
        "list" => print_list(&svc),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn main() {
    if let Err(msg) = run() {
        eprintln!("error: {}", msg);
        process::exit(1);
    }
}
