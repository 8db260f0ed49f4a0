//! Performance metrics computed once a backtest has finished.

use super::portfolio::Portfolio;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub final_value: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub total_fees: f64,
    pub total_trades: usize,
    pub round_trips: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    /// Sum of Sell profits. Each is measured against the entry price, so the
    /// Buy fee is not deducted and this differs from `final_value - initial_cash`.
    pub realized_profit: f64,
    pub avg_profit_pct: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl Metrics {
    /// Marks the open position (if any) to `final_price`.
    pub fn compute(portfolio: &Portfolio, final_price: f64) -> Self {
        let initial_cash = portfolio.initial_cash;
        let final_value = portfolio.current_value(final_price);

        let total_return = if initial_cash > 0.0 {
            (final_value - initial_cash) / initial_cash
        } else {
            0.0
        };

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_profit_pct = 0.0_f64;

        let closed = portfolio
            .trades
            .iter()
            .filter_map(|t| Some((t.profit?, t.profit_pct?)));

        for (profit, profit_pct) in closed {
            total_profit_pct += profit_pct;
            if profit > 0.0 {
                trades_won += 1;
                total_wins += profit;
                if profit > largest_win {
                    largest_win = profit;
                }
            } else if profit < 0.0 {
                trades_lost += 1;
                total_losses += profit.abs();
                if profit.abs() > largest_loss {
                    largest_loss = profit.abs();
                }
            } else {
                trades_breakeven += 1;
            }
        }

        let round_trips = trades_won + trades_lost + trades_breakeven;
        let win_rate = if round_trips > 0 {
            trades_won as f64 / round_trips as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_profit_pct = if round_trips > 0 {
            total_profit_pct / round_trips as f64
        } else {
            0.0
        };

        Metrics {
            final_value,
            total_return,
            max_drawdown: portfolio.max_drawdown,
            total_fees: portfolio.total_fees,
            total_trades: portfolio.trades.len(),
            round_trips,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            realized_profit: total_wins - total_losses,
            avg_profit_pct,
            largest_win,
            largest_loss,
        }
    }
}
