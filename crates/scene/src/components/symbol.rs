use foundation::color::Hsl;

/// What a feature represents, resolved to a concrete style at draw time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Symbol {
    /// Draws nothing.
    Hidden,
    Stop { synced: bool },
    RouteLine { synced: bool },
    StopPosition { synced: bool },
    TrafficStop,
    TrafficStopPosition,
    /// Traffic route segment; `None` when the route has no flow data.
    TrafficLine { speed: Option<f64> },
    Obstacle,
    ReferenceStop,
    ClusteredStop { fill: Hsl },
    BoundingBox,
}

/// Per-feature visibility flag plus the symbol restored when it is shown.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ComponentSymbol {
    pub visible: bool,
    pub when_visible: Symbol,
}

impl ComponentSymbol {
    pub fn shown(symbol: Symbol) -> Self {
        Self {
            visible: true,
            when_visible: symbol,
        }
    }

    /// Symbol to draw right now.
    pub fn current(&self) -> Symbol {
        if self.visible {
            self.when_visible
        } else {
            Symbol::Hidden
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ComponentSymbol, Symbol};

    #[test]
    fn hidden_features_draw_nothing() {
        let mut c = ComponentSymbol::shown(Symbol::Obstacle);
        assert_eq!(c.current(), Symbol::Obstacle);
        c.visible = false;
        assert_eq!(c.current(), Symbol::Hidden);
    }
}
