//! Strided word views over a frame buffer

/// One fixed word position repeated in every frame
///
/// `offset` is the word index inside a frame, `stride` the frame size in
/// words. Callers check that `offset + (count - 1) * stride` (plus one for
/// pairs) lies inside the buffer before reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotView {
    pub offset: usize,
    pub stride: usize,
}

impl SlotView {
    pub const fn new(offset: usize, stride: usize) -> Self {
        Self { offset, stride }
    }

    /// The same slot shifted by `words` inside the frame
    pub const fn shifted(self, words: usize) -> Self {
        Self {
            offset: self.offset + words,
            stride: self.stride,
        }
    }

    /// Word index of this slot in frame `frame`
    #[inline]
    pub fn index(&self, frame: usize) -> usize {
        frame * self.stride + self.offset
    }

    /// Word at frame `frame`
    #[inline]
    pub fn at(&self, data: &[u16], frame: usize) -> u16 {
        data[self.index(frame)]
    }

    /// Words from `count` consecutive frames
    pub fn words<'a>(self, data: &'a [u16], count: usize) -> impl Iterator<Item = u16> + 'a {
        data.iter()
            .skip(self.offset)
            .step_by(self.stride)
            .take(count)
            .copied()
    }

    /// `(first, second)` word pairs from `count` consecutive frames
    pub fn pairs<'a>(
        self,
        data: &'a [u16],
        count: usize,
    ) -> impl Iterator<Item = (u16, u16)> + 'a {
        (0..count).map(move |frame| {
            let i = self.index(frame);
            (data[i], data[i + 1])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_step_through_frames() {
        let data: Vec<u16> = (0..20).collect();
        let view = SlotView::new(2, 5);
        let got: Vec<u16> = view.words(&data, 4).collect();
        assert_eq!(got, vec![2, 7, 12, 17]);
        assert_eq!(view.at(&data, 3), 17);
        assert_eq!(view.shifted(1).at(&data, 0), 3);
    }

    #[test]
    fn test_pairs() {
        let data: Vec<u16> = (0..12).collect();
        let got: Vec<(u16, u16)> = SlotView::new(1, 4).pairs(&data, 3).collect();
        assert_eq!(got, vec![(1, 2), (5, 6), (9, 10)]);
    }
}
