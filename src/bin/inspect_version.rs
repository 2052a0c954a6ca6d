use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    dataset_versions::logging::init();
    dataset_versions::apps::run_inspect_version_stdout(std::env::args().skip(1))
}
