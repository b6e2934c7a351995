use proxyprobe_core::prompt;
use proxyprobe_core::storage::Store;

use crate::cli::args::PromptsArgs;
use crate::exit_codes::EXIT_SUCCESS;

/// Lists every prompt template; `[x]` marks those with cached evaluations.
pub fn run(args: PromptsArgs) -> anyhow::Result<i32> {
    let store = Store::open(&args.common.db)?;
    store.init_schema()?;
    let with_data = store.prompts_with_data()?;

    println!("Available prompt templates:\n");
    for name in prompt::available() {
        let marker = if with_data.iter().any(|p| p == name) {
            "x"
        } else {
            " "
        };
        let body = prompt::template(name)?;
        let first_line: String = body.lines().next().unwrap_or("").chars().take(80).collect();
        println!("  [{marker}] {name:<15} {first_line}");
    }
    Ok(EXIT_SUCCESS)
}
