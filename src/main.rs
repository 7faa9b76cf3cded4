fn main() {
    if let Err(e) = fertmix_rs::adapters::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
