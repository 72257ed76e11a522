fn main() {
    iimport::cli::run();
}
