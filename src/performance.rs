// =============================================================================
// Replay Performance — strategy vs buy-and-hold over a price history
// =============================================================================
//
// The strategy holds +1 while the trend is Positive, -1 while Negative and 0
// while Undefined, entering on the bar after the trend is known:
//
//   r_t          = position_{t-1} * (p_t / p_{t-1} - 1)
//   total_return = prod(1 + r_t) - 1
//   volatility   = sample_std(r) * sqrt(periods_per_year)
//   sharpe       = total_return * periods_per_year / volatility
//   win_rate     = #(r_t > 0) / #(r_t != 0)
//
// Ratios whose denominator is zero are reported as 0.
//
// `compare_averages` runs the simpler price-vs-average strategy for one EMA
// and one SMA side by side: long while the close is above the average, short
// while below, flat on a tie or while the average is cold.

use serde::{Deserialize, Serialize};

use crate::crossover::CrossoverEngine;
use crate::error::{EngineError, Result};
use crate::indicators::{EmaTracker, SmaTracker};
use crate::runtime_config::EngineConfig;
use crate::types::{EmaSeedPolicy, PricePoint, Signal, SignalKind, TrendSign};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub bars: usize,
    pub total_return: f64,
    pub buy_hold_return: f64,
    pub golden_crosses: usize,
    pub death_crosses: usize,
    pub strategy_volatility: f64,
    pub buy_hold_volatility: f64,
    pub strategy_sharpe: f64,
    pub buy_hold_sharpe: f64,
    pub win_rate: f64,
}

impl PerformanceReport {
    /// `prices` and `trends` are aligned per bar; `trends[t]` is the engine
    /// trend after ingesting `prices[t]`.
    pub fn from_replay(
        prices: &[f64],
        trends: &[TrendSign],
        signals: &[Signal],
        periods_per_year: f64,
    ) -> Self {
        debug_assert_eq!(prices.len(), trends.len());

        let market = market_returns(prices);
        let positions: Vec<f64> = trends.iter().map(|t| t.position()).collect();
        let strategy = position_returns(&market, &positions);

        let total_return = compound(&strategy);
        let buy_hold_return = match (prices.first(), prices.last()) {
            (Some(first), Some(last)) if prices.len() > 1 => last / first - 1.0,
            _ => 0.0,
        };

        let annualise = periods_per_year.sqrt();
        let strategy_volatility = sample_std(&strategy) * annualise;
        let buy_hold_volatility = sample_std(&market) * annualise;

        let active = strategy.iter().filter(|r| **r != 0.0).count();
        let wins = strategy.iter().filter(|r| **r > 0.0).count();

        Self {
            bars: prices.len(),
            total_return,
            buy_hold_return,
            golden_crosses: signals.iter().filter(|s| s.kind == SignalKind::Buy).count(),
            death_crosses: signals.iter().filter(|s| s.kind == SignalKind::Sell).count(),
            strategy_volatility,
            buy_hold_volatility,
            strategy_sharpe: ratio(total_return * periods_per_year, strategy_volatility),
            buy_hold_sharpe: ratio(buy_hold_return * periods_per_year, buy_hold_volatility),
            win_rate: ratio(wins as f64, active as f64),
        }
    }
}

/// One side of an [`AverageComparison`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyStats {
    pub window: usize,
    pub total_return: f64,
    pub volatility: f64,
    pub wins: usize,
}

impl StrategyStats {
    fn from_positions(window: usize, market: &[f64], positions: &[f64], annualise: f64) -> Self {
        let returns = position_returns(market, positions);
        Self {
            window,
            total_return: compound(&returns),
            volatility: sample_std(&returns) * annualise,
            wins: returns.iter().filter(|r| **r > 0.0).count(),
        }
    }
}

/// Price-vs-EMA against price-vs-SMA over the same closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageComparison {
    pub ema: StrategyStats,
    pub sma: StrategyStats,
}

pub fn compare_averages(
    prices: &[f64],
    ema_window: usize,
    sma_window: usize,
    seed: EmaSeedPolicy,
    periods_per_year: f64,
) -> Result<AverageComparison> {
    if ema_window == 0 {
        return Err(EngineError::ZeroWindow { name: "EMA" });
    }
    if sma_window == 0 {
        return Err(EngineError::ZeroWindow { name: "SMA" });
    }

    let mut ema = EmaTracker::new(ema_window, seed);
    let mut sma = SmaTracker::new(sma_window);
    let mut ema_positions = Vec::with_capacity(prices.len());
    let mut sma_positions = Vec::with_capacity(prices.len());

    for &price in prices {
        ema_positions.push(side_of(price, ema.update(price)));
        sma_positions.push(side_of(price, sma.update(price)));
    }

    let market = market_returns(prices);
    let annualise = periods_per_year.sqrt();
    Ok(AverageComparison {
        ema: StrategyStats::from_positions(ema_window, &market, &ema_positions, annualise),
        sma: StrategyStats::from_positions(sma_window, &market, &sma_positions, annualise),
    })
}

fn side_of(price: f64, average: Option<f64>) -> f64 {
    match average {
        Some(avg) if price > avg => 1.0,
        Some(avg) if price < avg => -1.0,
        _ => 0.0,
    }
}

fn market_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// `positions[t]` is held over bar t+1, so it earns `market[t]`.
fn position_returns(market: &[f64], positions: &[f64]) -> Vec<f64> {
    market.iter().zip(positions).map(|(r, p)| p * r).collect()
}

fn compound(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

fn sample_std(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}

/// Everything a single replay produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayOutcome {
    pub signals: Vec<Signal>,
    pub trends: Vec<TrendSign>,
    pub report: PerformanceReport,
}

/// Run a fresh engine over `points` and summarise the result.  Stops at the
/// first rejected point.
pub fn replay(
    config: &EngineConfig,
    points: &[PricePoint],
    periods_per_year: f64,
) -> Result<ReplayOutcome> {
    let mut engine = CrossoverEngine::new(config.clone())?;
    let mut prices = Vec::with_capacity(points.len());
    let mut trends = Vec::with_capacity(points.len());
    let mut signals = Vec::new();

    for point in points {
        if let Some(signal) = engine.process(*point)? {
            signals.push(signal);
        }
        prices.push(point.price);
        trends.push(engine.trend());
    }

    let report = PerformanceReport::from_replay(&prices, &trends, &signals, periods_per_year);
    Ok(ReplayOutcome {
        signals,
        trends,
        report,
    })
}
