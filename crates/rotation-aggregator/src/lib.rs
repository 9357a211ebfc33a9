//! Walks the sector → industry → stock catalog, synthesizes industry and
//! sector indices bottom-up, then evaluates every node's rotation
//! trajectories against its parent index ("relative") and the market-wide
//! benchmark ("broad"), plus a trend-quality flag. Best effort per node: a
//! failed or data-starved node is skipped or left empty, never aborts the
//! batch.

use std::collections::HashMap;

use rayon::prelude::*;

use rotation_core::{
    Benchmark, Frequency, FrequencySet, IndexSeries, Industry, NodeKind, PriceSeries, ResultNode,
    RotationConfig, RotationData, RotationDocument, RotationError, RotationSeries, Sector,
    SectorRollup, Security,
};


/// Run the full aggregation over an in-memory catalog and price map.
///
/// The only fatal errors are an invalid configuration and an unresolvable
/// benchmark, both raised before any node work starts. Output nesting and
/// ordering mirror the input exactly.
pub fn aggregate(
    structure: &[Sector],
    prices: &HashMap<String, PriceSeries>,
    config: &RotationConfig,
) -> Result<RotationDocument, RotationError> {
    config.validate()?;
    let (benchmark_id, benchmark) = resolve_benchmark(prices, &config.benchmark)?;
    let generated_at = benchmark.last_date().ok_or_else(|| {
        RotationError::InvalidConfig(format!("benchmark {benchmark_id} has no price history"))
    })?;

    tracing::info!(
        sectors = structure.len(),
        benchmark = %benchmark_id,
        "starting rotation aggregation"
    );

    // Sectors are mutually independent; fan out across them and collect in
    // input order.
    let sectors: Vec<ResultNode> = structure
        .par_iter()
        .map(|sector| build_sector_node(sector, prices, benchmark, config))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    tracing::info!(emitted = sectors.len(), "rotation aggregation complete");

    Ok(RotationDocument {
        generated_at,
        benchmark_id,
        sectors,
    })
}

/// Pick the primary benchmark series, falling back to the secondary symbol
/// when the primary is absent or empty. A run without any benchmark cannot
/// produce output.
fn resolve_benchmark<'a>(
    prices: &'a HashMap<String, PriceSeries>,
    benchmark: &Benchmark,
) -> Result<(String, &'a PriceSeries), RotationError> {
    for symbol in [&benchmark.primary, &benchmark.fallback] {
        if let Some(series) = prices.get(symbol) {
            if !series.is_empty() {
                if symbol != &benchmark.primary {
                    tracing::warn!(
                        primary = %benchmark.primary,
                        fallback = %symbol,
                        "primary benchmark unavailable, using fallback"
                    );
                }
                return Ok((symbol.clone(), series));
            }
        }
    }
    Err(RotationError::InvalidConfig(format!(
        "no price history for benchmark {} or fallback {}",
        benchmark.primary, benchmark.fallback
    )))
}

fn build_sector_node(
    sector: &Sector,
    prices: &HashMap<String, PriceSeries>,
    benchmark: &PriceSeries,
    config: &RotationConfig,
) -> Option<ResultNode> {
    // Bottom-up pass: industry indices first.
    let mut built: Vec<(&Industry, IndexSeries, f64)> = Vec::new();
    for industry in &sector.industries {
        let constituents: Vec<(Security, PriceSeries)> = industry
            .securities
            .iter()
            .filter_map(|security| {
                prices
                    .get(&security.symbol)
                    .map(|series| (security.clone(), series.clone()))
            })
            .collect();

        match index_builder::build(&constituents, config.weighting, config) {
            Some(index) => {
                let cap: f64 = industry
                    .securities
                    .iter()
                    .map(|s| s.market_cap.max(0.0))
                    .sum();
                built.push((industry, index, cap));
            }
            None => {
                tracing::debug!(
                    sector = %sector.name,
                    industry = %industry.name,
                    "industry skipped: no usable constituents"
                );
            }
        }
    }

    if built.is_empty() {
        tracing::debug!(sector = %sector.name, "sector skipped: no surviving industries");
        return None;
    }

    let sector_series = match rollup_sector(&built, config.sector_rollup) {
        Some(series) => series,
        None => {
            tracing::warn!(sector = %sector.name, "sector skipped: degenerate index rollup");
            return None;
        }
    };

    let industry_nodes: Vec<ResultNode> = built
        .iter()
        .map(|(industry, index, _)| {
            build_industry_node(industry, index, &sector_series, benchmark, prices, config)
        })
        .collect();

    Some(ResultNode {
        id: sector.name.clone(),
        name: sector.name.clone(),
        kind: NodeKind::Sector,
        is_bullish: Some(trend_screener::is_qualifying_trend(&sector_series)),
        rotation: evaluate(&sector_series, benchmark, benchmark, config),
        children: industry_nodes,
    })
}

fn build_industry_node(
    industry: &Industry,
    index: &IndexSeries,
    sector_series: &PriceSeries,
    benchmark: &PriceSeries,
    prices: &HashMap<String, PriceSeries>,
    config: &RotationConfig,
) -> ResultNode {
    let stock_nodes: Vec<ResultNode> = industry
        .securities
        .iter()
        .filter_map(|security| {
            let series = prices.get(&security.symbol)?;
            let rotation = evaluate(series, &index.series, benchmark, config);
            // A stock earns its place only by having a daily trajectory
            // against its own industry.
            if rotation.relative.daily.is_empty() {
                tracing::debug!(
                    symbol = %security.symbol,
                    industry = %industry.name,
                    "stock skipped: no daily rotation history"
                );
                return None;
            }
            Some(ResultNode {
                id: security.symbol.clone(),
                name: security.display_name.clone(),
                kind: NodeKind::Stock,
                is_bullish: Some(trend_screener::is_qualifying_trend(series)),
                rotation,
                children: Vec::new(),
            })
        })
        .collect();

    // Industries stand on their constructed index: an empty trajectory is
    // information, not an error.
    ResultNode {
        id: industry.name.clone(),
        name: industry.name.clone(),
        kind: NodeKind::Industry,
        is_bullish: Some(trend_screener::is_qualifying_trend(&index.series)),
        rotation: evaluate(&index.series, sector_series, benchmark, config),
        children: stock_nodes,
    }
}

/// Combine surviving industry indices into the sector index. Industry
/// indices are already base-100, so an equal-weight mean is a clean
/// composite; cap weighting uses each industry's summed constituent caps.
fn rollup_sector(
    built: &[(&Industry, IndexSeries, f64)],
    rollup: SectorRollup,
) -> Option<PriceSeries> {
    let total_cap: f64 = built.iter().map(|(_, _, cap)| cap).sum();
    let equal = 1.0 / built.len() as f64;

    let parts: Vec<(f64, &PriceSeries)> = built
        .iter()
        .map(|(_, index, cap)| {
            let weight = match rollup {
                SectorRollup::EqualWeight => equal,
                SectorRollup::CapWeight if total_cap > 0.0 => cap / total_cap,
                // No cap information at all: degrade to equal weights.
                SectorRollup::CapWeight => equal,
            };
            (weight, &index.series)
        })
        .collect();

    index_builder::blend_weighted(&parts)
}

/// Rotation trajectories for one node: relative mode against its parent
/// index, broad mode against the market benchmark, at every frequency.
fn evaluate(
    series: &PriceSeries,
    relative_benchmark: &PriceSeries,
    broad_benchmark: &PriceSeries,
    config: &RotationConfig,
) -> RotationData {
    RotationData {
        relative: rotation_set(series, relative_benchmark, config),
        broad: rotation_set(series, broad_benchmark, config),
    }
}

fn rotation_set(
    series: &PriceSeries,
    benchmark: &PriceSeries,
    config: &RotationConfig,
) -> FrequencySet<RotationSeries> {
    let run = |frequency: Frequency| {
        rotation_engine::compute(series, benchmark, frequency, config.window, config.tail)
    };
    FrequencySet {
        daily: run(Frequency::Daily),
        weekly: run(Frequency::Weekly),
        monthly: run(Frequency::Monthly),
    }
}
