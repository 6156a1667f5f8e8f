use anyhow::{Context, Result, bail};

/// Parse CLI seed tokens. Decimal and `0x`-prefixed hex are accepted.
pub fn parse_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = token.trim();
        let seed = if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            u64::from_str_radix(&hex.replace('_', ""), 16)
                .with_context(|| format!("invalid hex seed '{token}'"))?
        } else {
            token
                .replace('_', "")
                .parse::<u64>()
                .with_context(|| format!("invalid seed '{token}'"))?
        };
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    if seeds.is_empty() {
        bail!("at least one seed is required");
    }
    Ok(seeds)
}
