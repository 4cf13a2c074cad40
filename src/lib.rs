use lazy_static::lazy_static;

lazy_static! {
    static ref LOG: u64 = init_log();
}

// install a logger facility
fn init_log() -> u64 {
    let _res = env_logger::try_init();
    println!("\n ************** initializing logger *****************\n");
    1
}

pub mod csvio;
pub mod error;
pub mod merit;
pub mod rect;

pub use error::ClusterError;

/// installs the env_logger backend once
pub fn init_logger() {
    lazy_static::initialize(&LOG);
}
