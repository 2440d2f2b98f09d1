use std::process;

fn main() {
    if let Err(err) = gostc::run() {
        eprintln!("{err:#}");
        process::exit(1);
    }
}
