use crate::config::MovementConfig;

/// Regenerating pool of dash charges.
///
/// Spending a charge restarts a cooldown. Once the cooldown has elapsed, charges come back one
/// at a time, each after `recharge_time` seconds, until the pool is full again.
#[derive(Clone, Debug, PartialEq)]
pub struct DashChargePool {
    charges: u32,
    max: u32,
    recharge_delay: f32,
    recharge_time: f32,
    cooldown: f32,
    progress: f32,
}

impl DashChargePool {
    pub fn from_config(cfg: &MovementConfig) -> Self {
        let max = cfg.dash_max_charges.max(1);
        Self {
            charges: max,
            max,
            recharge_delay: cfg.dash_recharge_delay.max(0.0),
            recharge_time: cfg.dash_recharge_time.max(0.0),
            cooldown: 0.0,
            progress: 0.0,
        }
    }

    pub fn can_dash(&self) -> bool {
        self.charges > 0
    }

    /// Spend one charge. Returns `false` (and changes nothing) when the pool is empty.
    pub fn try_consume(&mut self) -> bool {
        if self.charges == 0 {
            return false;
        }

        self.charges -= 1;
        self.cooldown = self.recharge_delay;
        self.progress = 0.0;
        true
    }

    pub fn tick(&mut self, dt: f32) {
        if self.charges >= self.max {
            self.progress = 0.0;
            return;
        }

        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
            return;
        }

        self.progress += dt;
        if self.recharge_time <= 0.0 {
            self.charges = self.max;
            self.progress = 0.0;
            return;
        }

        while self.progress >= self.recharge_time && self.charges < self.max {
            self.progress -= self.recharge_time;
            self.charges += 1;
        }
        if self.charges >= self.max {
            self.progress = 0.0;
        }
    }

    pub fn charges(&self) -> u32 {
        self.charges
    }

    pub fn max_charges(&self) -> u32 {
        self.max
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown
    }

    /// Fraction of the next charge already recharged.
    pub fn recharge_progress(&self) -> f32 {
        if self.recharge_time <= 0.0 {
            return 0.0;
        }
        (self.progress / self.recharge_time).min(1.0)
    }
}
