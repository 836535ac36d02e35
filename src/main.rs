fn main() {
    resaddr::cli::run();
}
