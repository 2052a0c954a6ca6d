use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    dataset_versions::logging::init();
    dataset_versions::apps::run_build_dataset(std::env::args().skip(1))
}
