use html2slide::cli::{self, Parsed};
use html2slide::{translate, ChromePipeline};
use std::process::ExitCode;

fn init_logging(level: log::LevelFilter) {
    // RUST_LOG, when set, takes precedence over -v
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let options = match cli::parse_from(std::env::args_os()) {
        Ok(Parsed::Run(options)) => options,
        Ok(Parsed::Display(usage)) => {
            // Help/version text is the whole output
            let _ = usage.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", translate(&e));
            return ExitCode::FAILURE;
        }
    };

    init_logging(options.log_level());

    match ChromePipeline::default().run(&options) {
        Ok(result) => {
            println!("OK: {}", result.final_slide_path.display());
            println!("(intermediate) {}", result.intermediate_image_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::debug!("pipeline failed: {:?}", e);
            eprintln!("{}", translate(&e));
            ExitCode::FAILURE
        }
    }
}
