use crate::cli::Command;
use anyhow::Context;
use sapp::features::cart::{CartSessions, CartSnapshot, Decrement, SessionId};
use sapp::features::catalog::{Catalog, Facets, SearchQuery};
use std::collections::BTreeSet;
use std::io::Write;

/// Related items listed by `similar:<id>`.
const SIMILAR_LIMIT: usize = 2;

/// Replays shell commands against one cart session.
#[derive(Debug)]
pub(crate) struct Replay<'a> {
    catalog: &'a Catalog,
    sessions: &'a CartSessions,
    session: SessionId,
}

impl<'a> Replay<'a> {
    pub(crate) fn open(catalog: &'a Catalog, sessions: &'a CartSessions) -> Self {
        Self { catalog, sessions, session: sessions.open() }
    }

    pub(crate) fn run(&self, command: &Command, out: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::Add(id) => {
                let Some(item) = self.catalog.get(id) else {
                    return skip_unknown(command, id, out);
                };
                let quantity =
                    self.sessions.with_cart(&self.session, |cart| cart.add_or_increment(item.clone()))?;
                writeln!(out, "added {id} (qty {quantity})")?;
            },
            Command::Inc(id) => {
                if self.sessions.with_cart(&self.session, |cart| cart.increment(id))? {
                    writeln!(out, "incremented {id}")?;
                } else {
                    writeln!(out, "not in cart: {id}")?;
                }
            },
            Command::Dec(id) => match self.sessions.with_cart(&self.session, |cart| cart.decrement(id))? {
                Decrement::Decreased { quantity } => writeln!(out, "decreased {id} (qty {quantity})")?,
                Decrement::AtFloor { quantity } => writeln!(out, "{id} at floor (qty {quantity})")?,
                Decrement::Removed => writeln!(out, "removed {id}")?,
                Decrement::Missing => writeln!(out, "not in cart: {id}")?,
            },
            Command::Remove(id) => {
                if self.sessions.with_cart(&self.session, |cart| cart.remove(id))?.is_some() {
                    writeln!(out, "removed {id}")?;
                } else {
                    writeln!(out, "not in cart: {id}")?;
                }
            },
            Command::Save(id) => {
                let Some(item) = self.catalog.get(id) else {
                    return skip_unknown(command, id, out);
                };
                if self.sessions.with_wishlist(&self.session, |list| list.add(item.clone()))? {
                    writeln!(out, "saved {id}")?;
                } else {
                    writeln!(out, "already saved: {id}")?;
                }
            },
            Command::Move(id) => {
                let moved = self.sessions.with_session(&self.session, |session| {
                    session.wishlist.move_to_cart(id, &mut session.cart)
                })?;
                match moved {
                    Some(quantity) => writeln!(out, "moved {id} to cart (qty {quantity})")?,
                    None => writeln!(out, "not in wishlist: {id}")?,
                }
            },
            Command::Search(text) => {
                let hits = self.catalog.search(&SearchQuery::text(text.as_str()))?;
                writeln!(out, "search '{text}': {} hit(s)", hits.len())?;
                for item in &hits {
                    writeln!(out, "  {:<12} {:<32} {:>10}", item.id, item.title, item.price)?;
                }

                let facets = Facets::from_hits(hits.iter().copied());
                if let Some(bands) = facets.price_bands {
                    writeln!(
                        out,
                        "  refine: categories={} brands={} price=under {} | {} - {} | over {}",
                        join(&facets.categories),
                        join(&facets.brands),
                        bands.low,
                        bands.low,
                        bands.high,
                        bands.high
                    )?;
                }
            },
            Command::Similar(id) => {
                if !self.catalog.contains(id) {
                    return skip_unknown(command, id, out);
                }
                let related = self.catalog.similar(id, SIMILAR_LIMIT);
                writeln!(out, "similar to {id}: {} item(s)", related.len())?;
                for item in related {
                    writeln!(out, "  {:<12} {:<32} {:>10}", item.id, item.title, item.price)?;
                }
            },
            Command::Show => self.render(out)?,
        }

        Ok(())
    }

    pub(crate) fn snapshot(&self) -> anyhow::Result<CartSnapshot> {
        self.sessions.snapshot(&self.session).context("Cart session vanished during replay")
    }

    /// Prints cart lines, totals and the wishlist summary.
    pub(crate) fn render(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let CartSnapshot { lines, totals } = self.snapshot()?;

        writeln!(out, "cart:")?;
        if lines.is_empty() {
            writeln!(out, "  (empty)")?;
        }
        for line in &lines {
            writeln!(
                out,
                "  {:<12} {:<32} {:>4} x {:>10} = {:>10}",
                line.item.id,
                line.item.title,
                line.quantity,
                line.item.price,
                line.subtotal()
            )?;
        }
        writeln!(
            out,
            "totals: lines={} quantity={} amount={}",
            totals.line_count, totals.total_quantity, totals.total_amount
        )?;

        let (saved, value) = self
            .sessions
            .with_wishlist(&self.session, |list| (list.len(), list.total_value()))?;
        writeln!(out, "wishlist: items={saved} value={value}")?;
        Ok(())
    }

    pub(crate) fn close(self) {
        self.sessions.close(&self.session);
    }
}

fn join(values: &BTreeSet<&str>) -> String {
    if values.is_empty() {
        return "-".to_owned();
    }
    values.iter().copied().collect::<Vec<_>>().join(",")
}

fn skip_unknown(command: &Command, id: &str, out: &mut impl Write) -> anyhow::Result<()> {
    tracing::warn!(%command, "Unknown item, command skipped");
    writeln!(out, "skipped {command}: unknown item {id}")?;
    Ok(())
}
