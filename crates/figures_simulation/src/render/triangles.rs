//! Буфер треугольников для GPU submission
//!
//! Треугольники копятся батчами по `MAX_VERTICES` вершин (u16 индексы).
//! Заполненный батч запечатывается, `flush()` отдаёт всё накопленное.

use bevy::math::Vec2;

use super::Color;

/// Вершин в одном батче (512 треугольников)
pub const MAX_VERTICES: usize = 3 * 512;

/// Один draw call: позиции + RGBA8 цвета
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleBatch {
    pub vertices: Vec<Vec2>,
    pub colors: Vec<[u8; 4]>,
}

impl TriangleBatch {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Индексы 0..n (вершины не шарятся между треугольниками)
    pub fn indices(&self) -> Vec<u16> {
        (0..self.vertices.len() as u16).collect()
    }
}

#[derive(Debug, Clone)]
pub struct RenderTriangles {
    current: TriangleBatch,
    sealed: Vec<TriangleBatch>,
    max_vertices: usize,
}

impl Default for RenderTriangles {
    fn default() -> Self {
        Self::new(MAX_VERTICES)
    }
}

impl RenderTriangles {
    /// `max_vertices` округляется вниз до кратного 3 (минимум один треугольник)
    /// и ограничивается диапазоном u16 индексов.
    pub fn new(max_vertices: usize) -> Self {
        let max_vertices = (max_vertices.min(u16::MAX as usize) / 3).max(1) * 3;
        Self {
            current: TriangleBatch::default(),
            sealed: Vec::new(),
            max_vertices,
        }
    }

    pub fn max_vertices(&self) -> usize {
        self.max_vertices
    }

    pub fn push_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        if self.current.vertex_count() + 3 > self.max_vertices {
            self.seal();
        }

        let rgba = color.to_rgba8();
        self.current.vertices.extend_from_slice(&[a, b, c]);
        self.current.colors.extend_from_slice(&[rgba; 3]);
    }

    /// Сколько вершин накоплено с последнего flush
    pub fn vertex_count(&self) -> usize {
        self.sealed.iter().map(TriangleBatch::vertex_count).sum::<usize>()
            + self.current.vertex_count()
    }

    pub fn batch_count(&self) -> usize {
        self.sealed.len() + usize::from(!self.current.is_empty())
    }

    pub fn clear(&mut self) {
        self.current = TriangleBatch::default();
        self.sealed.clear();
    }

    /// Отдать все батчи и опустошить буфер
    pub fn flush(&mut self) -> Vec<TriangleBatch> {
        self.seal();
        std::mem::take(&mut self.sealed)
    }

    fn seal(&mut self) {
        if !self.current.is_empty() {
            self.sealed.push(std::mem::take(&mut self.current));
        }
    }
}
