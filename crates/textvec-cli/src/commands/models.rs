//! `textvec models`: print the supported registry.

use textvec_transformers::ModelKind;

pub fn run() -> anyhow::Result<()> {
    println!(
        "{:<28} {:<44} {:<12} {:>5} {:>7}",
        "NAME", "HUB ID", "ARCH", "DIM", "TOKENS"
    );
    for kind in ModelKind::all() {
        let spec = kind.spec();
        println!(
            "{:<28} {:<44} {:<12} {:>5} {:>7}",
            spec.name,
            spec.hub_id,
            spec.arch.to_string(),
            spec.dimension,
            spec.max_tokens
        );
    }
    Ok(())
}
