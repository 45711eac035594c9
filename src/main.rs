fn main() -> std::process::ExitCode {
    clinical_triage::run()
}
