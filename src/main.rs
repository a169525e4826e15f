fn main() {
    if let Err(e) = absorpgen_lib::run() {
        eprintln!("absorpgen: {e}");
        std::process::exit(1);
    }
}
