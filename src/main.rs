fn main() {
    wff::cli::run_cli();
}
