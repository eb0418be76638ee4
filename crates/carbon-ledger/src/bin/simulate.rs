fn main() {
    carbon_ledger::run::start(std::env::args());
}
