fn main() {
    if let Err(err) = sales_prep::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
