// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Rectangle allocation for atlas pages
//!
//! [`AreaAllocator`] packs rectangles left-to-right, top-to-bottom into
//! shelves. When a rectangle does not fit the current working area, the
//! area is grown (doubling the smaller axis first) up to a configured
//! maximum. There is no deallocation: one allocator packs one page.

/// Greedy shelf packer with area growth
///
/// Write-once: [`AreaAllocator::allocate`] either places a rectangle or
/// reports failure, in which case the caller should finish the current
/// page and start a new one with a fresh allocator.
#[derive(Clone, Debug)]
pub struct AreaAllocator {
    width: i32,
    height: i32,
    max_width: i32,
    max_height: i32,
    x: i32,
    y: i32,
    row_height: i32,
}

impl AreaAllocator {
    /// Construct with an initial and a maximum working area
    pub fn new(min_width: i32, min_height: i32, max_width: i32, max_height: i32) -> Self {
        debug_assert!(0 < min_width && min_width <= max_width);
        debug_assert!(0 < min_height && min_height <= max_height);
        AreaAllocator {
            width: min_width,
            height: min_height,
            max_width,
            max_height,
            x: 0,
            y: 0,
            row_height: 0,
        }
    }

    /// Current working width
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Current working height
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Reserve a `width` × `height` rectangle
    ///
    /// Returns the top-left corner of the placed rectangle, or `None` if
    /// it cannot fit even after growing to the maximum area.
    pub fn allocate(&mut self, width: i32, height: i32) -> Option<(i32, i32)> {
        if width <= 0 || height <= 0 || width > self.max_width || height > self.max_height {
            return None;
        }

        loop {
            if self.x + width <= self.width && self.y + height <= self.height {
                let pos = (self.x, self.y);
                self.x += width;
                self.row_height = self.row_height.max(height);
                return Some(pos);
            }

            // Advance to the next shelf if one has been started
            if self.row_height > 0
                && width <= self.width
                && self.y + self.row_height + height <= self.height
            {
                self.y += self.row_height;
                self.x = 0;
                self.row_height = 0;
                continue;
            }

            // Otherwise grow the working area, smaller axis first
            if self.width <= self.height && self.width < self.max_width {
                self.width = (self.width * 2).min(self.max_width);
            } else if self.height < self.max_height {
                self.height = (self.height * 2).min(self.max_height);
            } else if self.width < self.max_width {
                self.width = (self.width * 2).min(self.max_width);
            } else {
                return None;
            }
        }
    }
}
