use std::process;

fn main() {
    match syllabus_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("syllabus error: {err:#}");
            process::exit(1);
        }
    }
}
