//! Port to the trading platform hosting the session.

use crate::error::{BridgeError, HostError};
use crate::protocol::{OpenRequest, TradeSide};

/// Order execution primitives of the host platform.
///
/// Each call is synchronous and reports success or the host's own failure
/// reason. Implementations must not deliver position events re-entrantly
/// from inside these calls; events raised by an order are delivered to the
/// emitter after the current round has finished.
pub trait TradingHost {
    fn open_position(&mut self, side: TradeSide, request: &OpenRequest) -> Result<(), HostError>;

    fn modify_volume(
        &mut self,
        side: TradeSide,
        position_id: i32,
        volume: f64,
    ) -> Result<(), HostError>;

    fn modify_stop_loss(
        &mut self,
        side: TradeSide,
        position_id: i32,
        price: Option<f64>,
    ) -> Result<(), HostError>;

    fn modify_take_profit(
        &mut self,
        side: TradeSide,
        position_id: i32,
        price: Option<f64>,
    ) -> Result<(), HostError>;

    fn close_position(&mut self, side: TradeSide, position_id: i32) -> Result<(), HostError>;

    /// Halts the trading session. Called once, after a fatal error.
    fn stop(&mut self, reason: &BridgeError);
}

impl<H: TradingHost + ?Sized> TradingHost for &mut H {
    fn open_position(&mut self, side: TradeSide, request: &OpenRequest) -> Result<(), HostError> {
        (**self).open_position(side, request)
    }

    fn modify_volume(
        &mut self,
        side: TradeSide,
        position_id: i32,
        volume: f64,
    ) -> Result<(), HostError> {
        (**self).modify_volume(side, position_id, volume)
    }

    fn modify_stop_loss(
        &mut self,
        side: TradeSide,
        position_id: i32,
        price: Option<f64>,
    ) -> Result<(), HostError> {
        (**self).modify_stop_loss(side, position_id, price)
    }

    fn modify_take_profit(
        &mut self,
        side: TradeSide,
        position_id: i32,
        price: Option<f64>,
    ) -> Result<(), HostError> {
        (**self).modify_take_profit(side, position_id, price)
    }

    fn close_position(&mut self, side: TradeSide, position_id: i32) -> Result<(), HostError> {
        (**self).close_position(side, position_id)
    }

    fn stop(&mut self, reason: &BridgeError) {
        (**self).stop(reason)
    }
}
