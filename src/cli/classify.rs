use anyhow::Result;
use clap::Args;
use soulform::fill::classify;

#[derive(Args, Clone, Debug)]
pub struct ClassifyArgs {
    /// Element tag name, e.g. `input`
    pub tag: String,

    /// Value of the `type` attribute
    #[arg(value_name = "TYPE")]
    pub type_attr: Option<String>,
}

pub fn cmd_classify(args: ClassifyArgs) -> Result<()> {
    println!("{}", classify(&args.tag, args.type_attr.as_deref()));
    Ok(())
}
